//! seal_proto — the Sealed Envelope message protocol.
//!
//! A `Message` binds a header (sender and recipient key bundles) to an
//! AEAD ciphertext whose associated data is that same header, so tampering
//! with either part is caught on decode.
//!
//! # Modules
//! - `header`  — `Header` and the directional `associated_data` builder
//! - `message` — `Message::encode` / `Message::decode`
//! - `wire`    — serde wire structs (JSON, base64url binary fields)
//! - `limits`  — size limits applied before parsing / encryption
//! - `error`   — `MessageError` and its `ErrorKind` classes

pub mod error;
pub mod header;
pub mod limits;
pub mod message;
pub mod wire;

pub use error::{ErrorKind, MessageError};
pub use header::{associated_data, Header};
pub use limits::EnvelopeLimits;
pub use message::Message;
