//! Identity key management
//!
//! Each party has one long-term `IdentityKeyPair` (Ed25519). The identity key
//! signs the party's pre-keys and, converted to X25519, takes part in the
//! key agreement (see `keys::PrivateKeyBundle::shared_secret`).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

// ── Newtype wrappers ──────────────────────────────────────────────────────────

/// 32-byte Ed25519 public key, base64url-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKeyBytes([u8; 32]);

impl PublicKeyBytes {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "Identity public key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_b64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn from_b64(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD.decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Human-readable fingerprint: BLAKE3 of the public key, truncated to
    /// 20 bytes, hex-encoded in groups of 4 for display.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(&self.0);
        let hex = hex::encode(&hash.as_bytes()[..20]);
        hex.as_bytes()
            .chunks(4)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Verify an Ed25519 signature made by this key.
    pub fn verify(&self, msg: &[u8], sig_bytes: &[u8]) -> Result<(), CryptoError> {
        let vk = VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let sig = Signature::from_bytes(
            sig_bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKey("Bad sig len".into()))?,
        );
        vk.verify(msg, &sig)
            .map_err(|_| CryptoError::SignatureVerification)
    }

    /// The X25519 form of this identity key, used for Diffie-Hellman.
    ///
    /// Uses the birational map from the Ed25519 curve to Curve25519.
    pub fn to_x25519(&self) -> Result<X25519Public, CryptoError> {
        use curve25519_dalek::edwards::CompressedEdwardsY;
        let point = CompressedEdwardsY(self.0).decompress().ok_or_else(|| {
            CryptoError::InvalidKey("Ed25519 public key decompression failed".into())
        })?;
        Ok(X25519Public::from(point.to_montgomery().to_bytes()))
    }
}

// ── Identity keypair ──────────────────────────────────────────────────────────

/// Long-term identity signing key.  Drop clears memory via ZeroizeOnDrop.
#[derive(ZeroizeOnDrop)]
pub struct IdentityKeyPair {
    #[zeroize(skip)]
    public: PublicKeyBytes,
    secret_bytes: [u8; 32],
}

impl IdentityKeyPair {
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public = PublicKeyBytes(signing_key.verifying_key().to_bytes());
        Self {
            public,
            secret_bytes: signing_key.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "Identity key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        let signing_key = SigningKey::from_bytes(&arr);
        let public = PublicKeyBytes(signing_key.verifying_key().to_bytes());
        Ok(Self {
            public,
            secret_bytes: arr,
        })
    }

    pub fn public(&self) -> &PublicKeyBytes {
        &self.public
    }

    /// Sign arbitrary bytes; returns 64-byte raw Ed25519 signature.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        SigningKey::from_bytes(&self.secret_bytes)
            .sign(msg)
            .to_bytes()
            .to_vec()
    }

    /// Convert the Ed25519 signing key to an X25519 static secret.
    /// Clamped SHA-512 expansion, the same scalar ed25519-dalek uses
    /// internally, so it pairs with `PublicKeyBytes::to_x25519`.
    pub(crate) fn to_x25519_secret(&self) -> StaticSecret {
        let mut h = Sha512::digest(self.secret_bytes);
        // Clamp as per RFC 7748 §5
        h[0] &= 248;
        h[31] &= 127;
        h[31] |= 64;
        let mut key = [0u8; 32];
        key.copy_from_slice(&h[..32]);
        h.as_mut_slice().zeroize();
        let secret = StaticSecret::from(key);
        key.zeroize();
        secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let ik = IdentityKeyPair::generate();
        let sig = ik.sign(b"pre-key bytes");
        assert!(ik.public().verify(b"pre-key bytes", &sig).is_ok());
        assert!(matches!(
            ik.public().verify(b"other bytes", &sig),
            Err(CryptoError::SignatureVerification)
        ));
    }

    #[test]
    fn x25519_conversion_agrees() {
        // DH(a_secret, B_pub) must equal DH(b_secret, A_pub) across the
        // Ed25519 → X25519 conversion.
        let a = IdentityKeyPair::generate();
        let b = IdentityKeyPair::generate();
        let ab = a
            .to_x25519_secret()
            .diffie_hellman(&b.public().to_x25519().unwrap());
        let ba = b
            .to_x25519_secret()
            .diffie_hellman(&a.public().to_x25519().unwrap());
        assert_eq!(ab.as_bytes(), ba.as_bytes());
    }

    #[test]
    fn b64_roundtrip_and_length_check() {
        let ik = IdentityKeyPair::generate();
        let encoded = ik.public().to_b64();
        assert_eq!(&PublicKeyBytes::from_b64(&encoded).unwrap(), ik.public());
        assert!(PublicKeyBytes::from_b64(&URL_SAFE_NO_PAD.encode([0u8; 16])).is_err());
    }

    #[test]
    fn from_bytes_restores_public_key() {
        let bytes = [7u8; 32];
        let a = IdentityKeyPair::from_bytes(&bytes).unwrap();
        let b = IdentityKeyPair::from_bytes(&bytes).unwrap();
        assert_eq!(a.public(), b.public());
        assert_eq!(a.public().fingerprint().split(' ').count(), 10);
    }
}
