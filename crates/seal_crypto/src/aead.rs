//! Authenticated Encryption with Associated Data
//!
//! One suite is supported: `aes256GcmHkdfSha256`.
//! Per message: random 32-byte HKDF salt, random 12-byte GCM nonce.
//! Key = HKDF-SHA256(ikm = shared secret, salt, info = empty), 32 bytes.
//! The payload is AES-256-GCM ciphertext with the 16-byte tag appended.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::{error::CryptoError, kdf};

pub const HKDF_SALT_LEN: usize = 32;
pub const GCM_NONCE_LEN: usize = 12;
pub const GCM_TAG_LEN: usize = 16;

/// Encrypted payload container. Exactly one suite exists today; new suites
/// become new variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ciphertext {
    Aes256GcmHkdfSha256 {
        hkdf_salt: [u8; HKDF_SALT_LEN],
        gcm_nonce: [u8; GCM_NONCE_LEN],
        /// ciphertext || tag
        payload: Vec<u8>,
    },
}

/// Encrypt `plaintext` under a key derived from `secret`.
/// `aad` is authenticated but not encrypted.
pub fn encrypt(plaintext: &[u8], secret: &[u8], aad: &[u8]) -> Result<Ciphertext, CryptoError> {
    let mut hkdf_salt = [0u8; HKDF_SALT_LEN];
    let mut gcm_nonce = [0u8; GCM_NONCE_LEN];
    OsRng.fill_bytes(&mut hkdf_salt);
    OsRng.fill_bytes(&mut gcm_nonce);

    let key = kdf::message_key(secret, &hkdf_salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| CryptoError::AeadEncrypt)?;

    let payload = cipher
        .encrypt(
            Nonce::from_slice(&gcm_nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CryptoError::AeadEncrypt)?;

    Ok(Ciphertext::Aes256GcmHkdfSha256 {
        hkdf_salt,
        gcm_nonce,
        payload,
    })
}

/// Decrypt and authenticate. Fails on any tag mismatch, whether the
/// payload, the secret or the associated data changed.
pub fn decrypt(
    ciphertext: &Ciphertext,
    secret: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    match ciphertext {
        Ciphertext::Aes256GcmHkdfSha256 {
            hkdf_salt,
            gcm_nonce,
            payload,
        } => {
            if payload.len() < GCM_TAG_LEN {
                return Err(CryptoError::AeadDecrypt);
            }
            let key = kdf::message_key(secret, hkdf_salt)?;
            let cipher =
                Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| CryptoError::AeadDecrypt)?;

            let plaintext = cipher
                .decrypt(
                    Nonce::from_slice(gcm_nonce),
                    Payload {
                        msg: payload.as_slice(),
                        aad,
                    },
                )
                .map_err(|_| CryptoError::AeadDecrypt)?;

            Ok(Zeroizing::new(plaintext))
        }
    }
}
