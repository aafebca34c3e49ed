//! Size limits applied before any parsing or encryption work.

use serde::{Deserialize, Serialize};

/// Largest plaintext `encode` accepts (256 KiB).
pub const DEFAULT_MAX_PLAINTEXT_BYTES: usize = 256 * 1024;

/// Largest serialized envelope `decode` will parse (1 MiB). Leaves room for
/// base64 expansion of a maximal plaintext plus the header.
pub const DEFAULT_MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeLimits {
    pub max_plaintext_bytes: usize,
    pub max_envelope_bytes: usize,
}

impl Default for EnvelopeLimits {
    fn default() -> Self {
        Self {
            max_plaintext_bytes: DEFAULT_MAX_PLAINTEXT_BYTES,
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_BYTES,
        }
    }
}
