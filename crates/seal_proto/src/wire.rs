//! On-wire envelope types.
//!
//! The wire form of a message is exactly `{header, ciphertext}`:
//!
//! ```text
//! {"header":{"sender":KeyBundle,"recipient":KeyBundle},
//!  "ciphertext":{"aes256_gcm_hkdf_sha256":{"hkdf_salt":..,"gcm_nonce":..,"payload":..}}}
//! KeyBundle = {"identity_key":..,"pre_key":{"key":..,"signature":..}}
//! ```
//!
//! Every field that may be absent is an `Option` that is omitted when
//! `None` (never written as `null`), so presence survives a round-trip and
//! the serializer output is deterministic. Binary fields are base64url
//! without padding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use seal_crypto::{
    aead::{GCM_NONCE_LEN, HKDF_SALT_LEN},
    Ciphertext, KeyBundle, PublicKey, PublicKeyBytes, SignedPreKey,
};

use crate::error::MessageError;

fn b64d(field: &str, s: &str) -> Result<Vec<u8>, MessageError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| MessageError::InvalidEncoding(format!("{field}: {e}")))
}

fn b64d_array<const N: usize>(field: &str, s: &str) -> Result<[u8; N], MessageError> {
    let bytes = b64d(field, s)?;
    bytes.as_slice().try_into().map_err(|_| {
        MessageError::InvalidEncoding(format!("{field}: expected {} bytes, got {}", N, bytes.len()))
    })
}

// ── Key bundles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPreKeyWire {
    pub key: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBundleWire {
    pub identity_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_key: Option<SignedPreKeyWire>,
}

impl KeyBundleWire {
    pub fn from_bundle(bundle: &KeyBundle) -> Self {
        Self {
            identity_key: bundle.identity_key.to_b64(),
            pre_key: bundle.pre_key.as_ref().map(|pk| SignedPreKeyWire {
                key: URL_SAFE_NO_PAD.encode(pk.key.as_bytes()),
                signature: URL_SAFE_NO_PAD.encode(&pk.signature),
            }),
        }
    }

    /// Decode into a typed bundle. Only encodings are checked here; whether
    /// the pre-key is present is the caller's concern.
    pub fn to_bundle(&self) -> Result<KeyBundle, MessageError> {
        let identity_key = PublicKeyBytes::from_b64(&self.identity_key)
            .map_err(|e| MessageError::InvalidEncoding(format!("identity_key: {e}")))?;
        let pre_key = self
            .pre_key
            .as_ref()
            .map(|pk| -> Result<SignedPreKey, MessageError> {
                let key = PublicKey::from_bytes(&b64d("pre_key.key", &pk.key)?)
                    .map_err(|e| MessageError::InvalidEncoding(format!("pre_key.key: {e}")))?;
                Ok(SignedPreKey {
                    key,
                    signature: b64d("pre_key.signature", &pk.signature)?,
                })
            })
            .transpose()?;
        Ok(KeyBundle::new(identity_key, pre_key))
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Field order is part of the format: sender, then recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<KeyBundleWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<KeyBundleWire>,
}

// ── Ciphertext ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aes256GcmHkdfSha256Wire {
    pub hkdf_salt: String,
    pub gcm_nonce: String,
    pub payload: String,
}

impl Aes256GcmHkdfSha256Wire {
    pub fn to_ciphertext(&self) -> Result<Ciphertext, MessageError> {
        Ok(Ciphertext::Aes256GcmHkdfSha256 {
            hkdf_salt: b64d_array::<HKDF_SALT_LEN>("hkdf_salt", &self.hkdf_salt)?,
            gcm_nonce: b64d_array::<GCM_NONCE_LEN>("gcm_nonce", &self.gcm_nonce)?,
            payload: b64d("payload", &self.payload)?,
        })
    }
}

/// One optional field per suite; an envelope whose ciphertext names no
/// known suite is rejected at decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aes256_gcm_hkdf_sha256: Option<Aes256GcmHkdfSha256Wire>,
}

impl CiphertextWire {
    pub fn from_ciphertext(ciphertext: &Ciphertext) -> Self {
        match ciphertext {
            Ciphertext::Aes256GcmHkdfSha256 {
                hkdf_salt,
                gcm_nonce,
                payload,
            } => Self {
                aes256_gcm_hkdf_sha256: Some(Aes256GcmHkdfSha256Wire {
                    hkdf_salt: URL_SAFE_NO_PAD.encode(hkdf_salt),
                    gcm_nonce: URL_SAFE_NO_PAD.encode(gcm_nonce),
                    payload: URL_SAFE_NO_PAD.encode(payload),
                }),
            },
        }
    }
}

// ── Message ──────────────────────────────────────────────────────────────────

/// Parsed but unauthenticated envelope. Only `Message::decode` turns one of
/// these into a `Message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciphertext: Option<CiphertextWire>,
}

impl MessageWire {
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
