//! Envelope header and the associated-data builder.
//!
//! The header names who sent the message and which recipient bundle (and so
//! which pre-key) it was sealed to. Its serialized form doubles as the AEAD
//! associated data, so both sides must produce identical bytes for the same
//! `(sender, recipient)` pair.

use seal_crypto::KeyBundle;

use crate::{
    error::MessageError,
    wire::{HeaderWire, KeyBundleWire},
};

/// Either field may be absent while decoding; a header inside a finished
/// `Message` always has both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub sender: Option<KeyBundle>,
    pub recipient: Option<KeyBundle>,
}

impl Header {
    pub fn new(sender: KeyBundle, recipient: KeyBundle) -> Self {
        Self {
            sender: Some(sender),
            recipient: Some(recipient),
        }
    }

    /// Convert each present field. Encodings are checked, presence is not.
    pub fn from_wire(wire: &HeaderWire) -> Result<Self, MessageError> {
        Ok(Self {
            sender: wire.sender.as_ref().map(KeyBundleWire::to_bundle).transpose()?,
            recipient: wire
                .recipient
                .as_ref()
                .map(KeyBundleWire::to_bundle)
                .transpose()?,
        })
    }

    pub fn to_wire(&self) -> HeaderWire {
        HeaderWire {
            sender: self.sender.as_ref().map(KeyBundleWire::from_bundle),
            recipient: self.recipient.as_ref().map(KeyBundleWire::from_bundle),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(&self.to_wire())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        let wire: HeaderWire = serde_json::from_slice(bytes)?;
        Self::from_wire(&wire)
    }
}

/// Bytes authenticated alongside the ciphertext: the serialized
/// `Header { sender, recipient }`. Order matters; `(a, b)` and `(b, a)`
/// give different bytes, so a message cannot be reflected back to its
/// sender.
pub fn associated_data(sender: &KeyBundle, recipient: &KeyBundle) -> Result<Vec<u8>, MessageError> {
    Header::new(sender.clone(), recipient.clone()).to_bytes()
}
