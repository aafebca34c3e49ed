//! The sealed message envelope.
//!
//! `Message::encode` and `Message::decode` are the only ways to obtain a
//! `Message`, so every value of this type either was sealed locally or has
//! passed the full decode validation and AEAD authentication.
//!
//! Decode order (each step fatal, nothing is attempted after a failure):
//!   1. size limit, parse
//!   2. header present, sender present, recipient present
//!   3. recipient pre-key named in the header
//!   4. local bundle has an active pre-key, then has any pre-keys at all
//!   5. header pre-key matches the active pre-key, header recipient bundle
//!      matches the local bundle
//!   6. ciphertext carries the supported suite
//!   7. shared secret (recipient role), associated data, AEAD decrypt
//!   8. UTF-8

use seal_crypto::{aead, Ciphertext, KeyBundle, PrivateKeyBundle};
use tracing::{debug, warn};

use crate::{
    error::MessageError,
    header::{associated_data, Header},
    limits::EnvelopeLimits,
    wire::{CiphertextWire, MessageWire},
};

#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    sender: KeyBundle,
    recipient: KeyBundle,
    ciphertext: Ciphertext,
    /// Local convenience copy of the plaintext; never serialized.
    decrypted: Option<String>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("sender", &self.sender.identity_key.fingerprint())
            .field("recipient", &self.recipient.identity_key.fingerprint())
            .field("ciphertext", &self.ciphertext)
            .field(
                "decrypted",
                &self
                    .decrypted
                    .as_ref()
                    .map(|text| format!("<redacted {} bytes>", text.len())),
            )
            .finish()
    }
}

impl Message {
    /// Seal `plaintext` from `sender` to `recipient`.
    pub async fn encode(
        sender: &PrivateKeyBundle,
        recipient: &KeyBundle,
        plaintext: &str,
    ) -> Result<Self, MessageError> {
        Self::encode_with_limits(sender, recipient, plaintext, &EnvelopeLimits::default()).await
    }

    pub async fn encode_with_limits(
        sender: &PrivateKeyBundle,
        recipient: &KeyBundle,
        plaintext: &str,
        limits: &EnvelopeLimits,
    ) -> Result<Self, MessageError> {
        let bytes = plaintext.as_bytes();
        if bytes.len() > limits.max_plaintext_bytes {
            return Err(MessageError::PlaintextTooLarge {
                size: bytes.len(),
                limit: limits.max_plaintext_bytes,
            });
        }

        // Never agree on a secret with a pre-key the recipient did not sign.
        recipient.verify_pre_key()?;
        let secret = sender.shared_secret(recipient, false)?;

        let sender_bundle = sender.key_bundle();
        let aad = associated_data(&sender_bundle, recipient)?;
        let ciphertext = aead::encrypt(bytes, &secret[..], &aad)?;

        let message = Self {
            sender: sender_bundle,
            recipient: recipient.clone(),
            ciphertext,
            decrypted: Some(plaintext.to_owned()),
        };
        debug!(
            sender = %message.sender.identity_key.fingerprint(),
            recipient = %message.recipient.identity_key.fingerprint(),
            plaintext_len = bytes.len(),
            "sealed message"
        );
        Ok(message)
    }

    /// Validate, authenticate and decrypt `bytes` addressed to `recipient`.
    pub async fn decode(recipient: &PrivateKeyBundle, bytes: &[u8]) -> Result<Self, MessageError> {
        Self::decode_with_limits(recipient, bytes, &EnvelopeLimits::default()).await
    }

    pub async fn decode_with_limits(
        recipient: &PrivateKeyBundle,
        bytes: &[u8],
        limits: &EnvelopeLimits,
    ) -> Result<Self, MessageError> {
        match Self::open(recipient, bytes, limits) {
            Ok(message) => {
                debug!(
                    sender = %message.sender.identity_key.fingerprint(),
                    envelope_len = bytes.len(),
                    "opened message"
                );
                Ok(message)
            }
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, envelope_len = bytes.len(), "rejected message");
                Err(err)
            }
        }
    }

    fn open(
        recipient: &PrivateKeyBundle,
        bytes: &[u8],
        limits: &EnvelopeLimits,
    ) -> Result<Self, MessageError> {
        if bytes.len() > limits.max_envelope_bytes {
            return Err(MessageError::EnvelopeTooLarge {
                size: bytes.len(),
                limit: limits.max_envelope_bytes,
            });
        }
        let wire = MessageWire::from_bytes(bytes)?;

        // ── Structure ───────────────────────────────────────────────────────
        let header = wire.header.as_ref().ok_or(MessageError::MissingHeader)?;
        let sender_wire = header.sender.as_ref().ok_or(MessageError::MissingSender)?;
        let recipient_wire = header
            .recipient
            .as_ref()
            .ok_or(MessageError::MissingRecipient)?;
        if recipient_wire.pre_key.is_none() {
            return Err(MessageError::MissingRecipientPreKey);
        }
        let sender = sender_wire.to_bundle()?;
        let header_recipient = recipient_wire.to_bundle()?;
        let header_pre_key = header_recipient
            .pre_key
            .as_ref()
            .ok_or(MessageError::MissingRecipientPreKey)?;

        // ── Local key state ─────────────────────────────────────────────────
        let active = recipient.pre_key().ok_or(MessageError::NoActivePreKey)?;
        if recipient.pre_keys().is_empty() {
            return Err(MessageError::NoPreKeys);
        }

        // ── Identity ────────────────────────────────────────────────────────
        if !active.public().key.matches(&header_pre_key.key) {
            return Err(MessageError::PreKeyMismatch);
        }
        let own_bundle = recipient.key_bundle();
        if header_recipient != own_bundle {
            return Err(MessageError::RecipientBundleMismatch);
        }

        let ciphertext = wire
            .ciphertext
            .as_ref()
            .and_then(|ct| ct.aes256_gcm_hkdf_sha256.as_ref())
            .ok_or(MessageError::MissingCiphertextPayload)?
            .to_ciphertext()?;

        // ── Decrypt ─────────────────────────────────────────────────────────
        let secret = recipient.shared_secret(&sender, true)?;
        let aad = associated_data(&sender, &own_bundle)?;
        let plaintext = aead::decrypt(&ciphertext, &secret[..], &aad)?;
        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| MessageError::InvalidUtf8)?
            .to_owned();

        Ok(Self {
            sender,
            recipient: own_bundle,
            ciphertext,
            decrypted: Some(text),
        })
    }

    pub fn header(&self) -> Header {
        Header::new(self.sender.clone(), self.recipient.clone())
    }

    pub fn sender(&self) -> &KeyBundle {
        &self.sender
    }

    pub fn recipient(&self) -> &KeyBundle {
        &self.recipient
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    pub fn decrypted(&self) -> Option<&str> {
        self.decrypted.as_deref()
    }

    pub fn to_wire(&self) -> MessageWire {
        MessageWire {
            header: Some(self.header().to_wire()),
            ciphertext: Some(CiphertextWire::from_ciphertext(&self.ciphertext)),
        }
    }

    /// Wire bytes: `{header, ciphertext}` only.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        self.to_wire().to_bytes()
    }

    /// Stable id derived from the wire bytes.
    pub fn id(&self) -> Result<String, MessageError> {
        Ok(seal_crypto::hash::envelope_id(&self.to_bytes()?))
    }
}
