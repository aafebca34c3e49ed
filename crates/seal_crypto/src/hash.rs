//! BLAKE3-based hash utilities

/// Deterministic envelope ID: BLAKE3 over the exact wire bytes, domain
/// separated, hex-encoded.
pub fn envelope_id(wire_bytes: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"seal-envelope-id-v1\x00");
    hasher.update(wire_bytes);
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_and_input_sensitive() {
        assert_eq!(envelope_id(b"abc"), envelope_id(b"abc"));
        assert_ne!(envelope_id(b"abc"), envelope_id(b"abd"));
        assert_eq!(envelope_id(b"").len(), 64);
    }
}
