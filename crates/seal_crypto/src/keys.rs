//! Key bundles and the three-DH key agreement.
//!
//! A `KeyBundle` is what a party publishes: its Ed25519 identity key and a
//! signed X25519 pre-key. A `PrivateKeyBundle` holds the matching secrets:
//! the identity keypair, the active pre-key, and the pre-key inventory.
//!
//! Agreement (IK = own identity as X25519, PK = own active pre-key,
//! IK'/PK' = the peer's):
//!
//!   sender    (is_recipient = false): DH1 = IK × PK'   DH2 = PK × IK'
//!   recipient (is_recipient = true):  DH1 = PK × IK'   DH2 = IK × PK'
//!   both:                             DH3 = PK × PK'
//!
//!   secret = DH1 || DH2 || DH3
//!
//! DH is commutative, so the two roles land on the same 96 bytes. Calling
//! both sides with the same flag swaps DH1/DH2 and the secrets diverge.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::Zeroizing;

use crate::{
    error::CryptoError,
    identity::{IdentityKeyPair, PublicKeyBytes},
};

pub const SHARED_SECRET_LEN: usize = 96;

/// 96-byte agreement output. Zeroized on drop.
pub type SharedSecret = Zeroizing<[u8; SHARED_SECRET_LEN]>;

// ── Public keys ──────────────────────────────────────────────────────────────

/// X25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(X25519Public);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("Pre-key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(X25519Public::from(arr)))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Constant-time equality on the encoded key.
    pub fn matches(&self, other: &PublicKey) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

/// Pre-key plus the owner's identity signature over its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPreKey {
    pub key: PublicKey,
    pub signature: Vec<u8>,
}

// ── Public bundle ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBundle {
    pub identity_key: PublicKeyBytes,
    /// Absent only in malformed or partial bundles; agreement needs it.
    pub pre_key: Option<SignedPreKey>,
}

impl KeyBundle {
    pub fn new(identity_key: PublicKeyBytes, pre_key: Option<SignedPreKey>) -> Self {
        Self {
            identity_key,
            pre_key,
        }
    }

    /// Check the pre-key signature against the bundle's identity key.
    pub fn verify_pre_key(&self) -> Result<(), CryptoError> {
        let pre_key = self.pre_key.as_ref().ok_or(CryptoError::PeerMissingPreKey)?;
        self.identity_key
            .verify(pre_key.key.as_bytes(), &pre_key.signature)
    }
}

// ── Private bundle ───────────────────────────────────────────────────────────

pub struct PrivatePreKey {
    secret: StaticSecret,
    signed: SignedPreKey,
}

impl PrivatePreKey {
    /// Fresh X25519 pre-key, signed by `identity`.
    pub fn generate(identity: &IdentityKeyPair) -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let key = PublicKey(X25519Public::from(&secret));
        let signature = identity.sign(key.as_bytes());
        Self {
            secret,
            signed: SignedPreKey { key, signature },
        }
    }

    pub fn public(&self) -> &SignedPreKey {
        &self.signed
    }
}

impl Clone for PrivatePreKey {
    fn clone(&self) -> Self {
        Self {
            secret: StaticSecret::from(self.secret.to_bytes()),
            signed: self.signed.clone(),
        }
    }
}

pub struct PrivateKeyBundle {
    identity: IdentityKeyPair,
    pre_key: Option<PrivatePreKey>,
    pre_keys: Vec<PrivatePreKey>,
}

impl PrivateKeyBundle {
    /// New identity with one pre-key, which is both active and the whole
    /// inventory.
    pub fn generate() -> Self {
        let identity = IdentityKeyPair::generate();
        let pre_key = PrivatePreKey::generate(&identity);
        Self {
            pre_keys: vec![pre_key.clone()],
            pre_key: Some(pre_key),
            identity,
        }
    }

    /// Assemble a bundle from parts. The active pre-key and the inventory
    /// are independent; nothing here selects one from the other.
    pub fn from_parts(
        identity: IdentityKeyPair,
        pre_key: Option<PrivatePreKey>,
        pre_keys: Vec<PrivatePreKey>,
    ) -> Self {
        Self {
            identity,
            pre_key,
            pre_keys,
        }
    }

    pub fn identity(&self) -> &IdentityKeyPair {
        &self.identity
    }

    pub fn pre_key(&self) -> Option<&PrivatePreKey> {
        self.pre_key.as_ref()
    }

    pub fn pre_keys(&self) -> &[PrivatePreKey] {
        &self.pre_keys
    }

    /// Public projection: identity key plus the active pre-key.
    pub fn key_bundle(&self) -> KeyBundle {
        KeyBundle {
            identity_key: self.identity.public().clone(),
            pre_key: self.pre_key.as_ref().map(|pk| pk.signed.clone()),
        }
    }

    /// Derive the shared secret with `peer`. `is_recipient` selects the
    /// role: `false` when encrypting to the peer, `true` when decrypting
    /// from it.
    pub fn shared_secret(
        &self,
        peer: &KeyBundle,
        is_recipient: bool,
    ) -> Result<SharedSecret, CryptoError> {
        let own_pre_key = self
            .pre_key
            .as_ref()
            .ok_or(CryptoError::MissingActivePreKey)?;
        let peer_pre_key = peer
            .pre_key
            .as_ref()
            .ok_or(CryptoError::PeerMissingPreKey)?;

        let own_ik = self.identity.to_x25519_secret();
        let peer_ik = peer.identity_key.to_x25519()?;
        let peer_pk = &peer_pre_key.key.0;

        let (dh1, dh2) = if is_recipient {
            (
                own_pre_key.secret.diffie_hellman(&peer_ik),
                own_ik.diffie_hellman(peer_pk),
            )
        } else {
            (
                own_ik.diffie_hellman(peer_pk),
                own_pre_key.secret.diffie_hellman(&peer_ik),
            )
        };
        let dh3 = own_pre_key.secret.diffie_hellman(peer_pk);

        let mut secret = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        secret[..32].copy_from_slice(dh1.as_bytes());
        secret[32..64].copy_from_slice(dh2.as_bytes());
        secret[64..].copy_from_slice(dh3.as_bytes());
        Ok(secret)
    }
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_agree_on_secret() {
        let alice = PrivateKeyBundle::generate();
        let bob = PrivateKeyBundle::generate();

        let a = alice.shared_secret(&bob.key_bundle(), false).unwrap();
        let b = bob.shared_secret(&alice.key_bundle(), true).unwrap();
        assert_eq!(*a, *b, "sender and recipient must derive the same secret");
    }

    #[test]
    fn same_role_on_both_sides_diverges() {
        let alice = PrivateKeyBundle::generate();
        let bob = PrivateKeyBundle::generate();

        let a = alice.shared_secret(&bob.key_bundle(), false).unwrap();
        let b_wrong = bob.shared_secret(&alice.key_bundle(), false).unwrap();
        assert_ne!(*a, *b_wrong);

        let a_wrong = alice.shared_secret(&bob.key_bundle(), true).unwrap();
        let b = bob.shared_secret(&alice.key_bundle(), true).unwrap();
        assert_ne!(*a_wrong, *b);
    }

    #[test]
    fn third_party_gets_different_secret() {
        let alice = PrivateKeyBundle::generate();
        let bob = PrivateKeyBundle::generate();
        let eve = PrivateKeyBundle::generate();

        let a = alice.shared_secret(&bob.key_bundle(), false).unwrap();
        let e = eve.shared_secret(&alice.key_bundle(), true).unwrap();
        assert_ne!(*a, *e);
    }

    #[test]
    fn missing_pre_keys_fail() {
        let alice = PrivateKeyBundle::generate();
        let bob = PrivateKeyBundle::generate();

        let mut stripped = bob.key_bundle();
        stripped.pre_key = None;
        assert!(matches!(
            alice.shared_secret(&stripped, false),
            Err(CryptoError::PeerMissingPreKey)
        ));

        let no_active = PrivateKeyBundle::from_parts(
            IdentityKeyPair::generate(),
            None,
            Vec::new(),
        );
        assert!(matches!(
            no_active.shared_secret(&bob.key_bundle(), false),
            Err(CryptoError::MissingActivePreKey)
        ));
    }

    #[test]
    fn pre_key_signature_verifies() {
        let bob = PrivateKeyBundle::generate();
        assert!(bob.key_bundle().verify_pre_key().is_ok());

        // Pre-key signed by someone else.
        let eve = IdentityKeyPair::generate();
        let forged = PrivateKeyBundle::from_parts(
            IdentityKeyPair::generate(),
            Some(PrivatePreKey::generate(&eve)),
            Vec::new(),
        );
        assert!(matches!(
            forged.key_bundle().verify_pre_key(),
            Err(CryptoError::SignatureVerification)
        ));
    }

    #[test]
    fn matches_compares_keys() {
        let ik = IdentityKeyPair::generate();
        let a = PrivatePreKey::generate(&ik);
        let b = PrivatePreKey::generate(&ik);
        assert!(a.public().key.matches(&a.clone().public().key));
        assert!(!a.public().key.matches(&b.public().key));
    }

    #[test]
    fn public_key_length_is_checked() {
        assert!(PublicKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PublicKey::from_bytes(&[1u8; 32]).is_ok());
    }
}
