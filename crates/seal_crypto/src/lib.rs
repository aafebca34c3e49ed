//! seal_crypto — key bundles, key agreement and the message cipher suite
//! underneath the Sealed Envelope protocol.
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Nothing here knows about headers or envelopes; `seal_proto` composes
//!   these pieces.
//!
//! # Module layout
//! - `identity` — long-term Ed25519 identity keys, Ed25519 → X25519 mapping
//! - `keys`     — `KeyBundle` / `PrivateKeyBundle`, three-DH shared secret
//! - `aead`     — `aes256GcmHkdfSha256` suite: `Ciphertext`, encrypt/decrypt
//! - `kdf`      — HKDF-SHA256
//! - `hash`     — BLAKE3 envelope ids
//! - `error`    — unified error type

pub mod aead;
pub mod error;
pub mod hash;
pub mod identity;
pub mod kdf;
pub mod keys;

pub use aead::Ciphertext;
pub use error::CryptoError;
pub use identity::{IdentityKeyPair, PublicKeyBytes};
pub use keys::{KeyBundle, PrivateKeyBundle, PrivatePreKey, PublicKey, SharedSecret, SignedPreKey};
