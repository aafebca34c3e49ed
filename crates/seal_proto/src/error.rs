use seal_crypto::CryptoError;
use thiserror::Error;

/// Coarse failure class. Every decode failure means "reject this message";
/// the class exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    KeyState,
    IdentityMismatch,
    Crypto,
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid field encoding: {0}")]
    InvalidEncoding(String),

    #[error("Envelope is {size} bytes, limit is {limit}")]
    EnvelopeTooLarge { size: usize, limit: usize },

    #[error("Plaintext is {size} bytes, limit is {limit}")]
    PlaintextTooLarge { size: usize, limit: usize },

    #[error("Envelope has no header")]
    MissingHeader,

    #[error("Header has no sender")]
    MissingSender,

    #[error("Header has no recipient")]
    MissingRecipient,

    #[error("Header recipient has no pre-key")]
    MissingRecipientPreKey,

    #[error("Ciphertext carries no aes256GcmHkdfSha256 payload")]
    MissingCiphertextPayload,

    #[error("Recipient bundle has no active pre-key")]
    NoActivePreKey,

    #[error("Recipient bundle holds no pre-keys")]
    NoPreKeys,

    #[error("Header pre-key does not match the recipient's active pre-key")]
    PreKeyMismatch,

    #[error("Header recipient bundle does not match the local bundle")]
    RecipientBundleMismatch,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

impl MessageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed(_)
            | Self::InvalidEncoding(_)
            | Self::EnvelopeTooLarge { .. }
            | Self::PlaintextTooLarge { .. }
            | Self::MissingHeader
            | Self::MissingSender
            | Self::MissingRecipient
            | Self::MissingRecipientPreKey
            | Self::MissingCiphertextPayload => ErrorKind::Structural,
            Self::NoActivePreKey | Self::NoPreKeys => ErrorKind::KeyState,
            Self::PreKeyMismatch | Self::RecipientBundleMismatch => ErrorKind::IdentityMismatch,
            Self::Crypto(_) | Self::InvalidUtf8 => ErrorKind::Crypto,
        }
    }
}
