//! # Ephemeral Key Material
//!
//! Every key and nonce in Quardian is generated for exactly one operation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         EPHEMERAL KEY TYPES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SymmetricKey (32 bytes)   AES-256-GCM key, returned to the caller     │
//! │                            once, zeroized on drop                       │
//! │                                                                         │
//! │  Nonce (12 bytes)          AES-GCM IV, fresh per encrypt call           │
//! │                                                                         │
//! │  SigningKeyPair            Ed25519 keypair, private half dropped        │
//! │                            (and zeroized) right after signing           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ed25519_dalek::pkcs8::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-256-GCM key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of a DER-encoded Ed25519 SubjectPublicKeyInfo
pub const SPKI_PUBLIC_KEY_SIZE: usize = 44;

/// An AES-256-GCM key
///
/// Zeroized when dropped. There is no key at rest: the only copy that
/// survives an encrypt call is the base64 string handed back to the caller.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh key from the operating system's CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// A nonce (number used once) for AES-GCM
///
/// **Never reuse a nonce with the same key.** Quardian never reuses a key
/// either, so each (key, nonce) pair is used exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    pub fn generate() -> Self {
        Self {
            secret: SigningKey::generate(&mut OsRng),
        }
    }

    /// Get the verifying key
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// Encode a verifying key as DER SubjectPublicKeyInfo
pub fn public_key_to_spki(key: &VerifyingKey) -> Result<Vec<u8>> {
    key.to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| Error::CryptoFailure(format!("SPKI encoding failed: {}", e)))
}

/// Decode a verifying key from DER SubjectPublicKeyInfo
pub fn public_key_from_spki(der: &[u8]) -> Result<VerifyingKey> {
    VerifyingKey::from_public_key_der(der)
        .map_err(|e| Error::malformed(format!("publicKey is not an Ed25519 SPKI key: {}", e)))
}
