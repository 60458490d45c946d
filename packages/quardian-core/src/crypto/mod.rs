//! # Cryptography Module
//!
//! The cryptographic operation core of Quardian.
//!
//! ## Scheme Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SCHEME REGISTRY                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   "AES-GCM" / "AES-256-GCM" ──► SymmetricScheme { encrypt, decrypt }   │
//! │                                    └── AesGcm                          │
//! │                                                                         │
//! │   "Ed25519"                 ──► SignatureScheme { sign, verify }       │
//! │                                    └── Ed25519                         │
//! │                                                                         │
//! │   Result records (EncryptionResult, SignatureResult) do not depend     │
//! │   on the scheme, so a post-quantum scheme can be registered later      │
//! │   without changing what callers receive.                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Notes |
//! |-----------|---------|-------|
//! | AES-256-GCM | Encryption | Stand-in for a future PQ hybrid |
//! | Ed25519 | Signing | Stand-in for a future PQ signature |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: symmetric keys and signing keys are wiped on drop
//! 2. **Secure Random**: `rand::rngs::OsRng` for every key and nonce
//! 3. **No Key Reuse**: every call generates its own key material

mod encryption;
mod keys;
mod signing;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use encryption::{open, seal, AesGcm, DecryptionInput, AES_GCM};
pub use keys::{
    public_key_from_spki, public_key_to_spki, Nonce, SigningKeyPair, SymmetricKey, KEY_SIZE,
    NONCE_SIZE, SPKI_PUBLIC_KEY_SIZE, TAG_SIZE,
};
pub use signing::{Ed25519, ED25519, SIGNATURE_SIZE};

// ============================================================================
// RESULT RECORDS
// ============================================================================

/// Output of a symmetric encrypt call
///
/// `key` is the only copy of the key. Losing it loses the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionResult {
    /// Identifier of the cipher construction
    #[serde(rename = "algorithm")]
    pub scheme: String,
    /// Base64 ciphertext (tag excluded)
    pub ciphertext: String,
    /// Base64 12-byte initialization vector
    pub iv: String,
    /// Base64 16-byte authentication tag
    pub tag: String,
    /// Base64 32-byte ephemeral key
    pub key: String,
}

impl fmt::Debug for EncryptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionResult")
            .field("scheme", &self.scheme)
            .field("ciphertext", &self.ciphertext)
            .field("iv", &self.iv)
            .field("tag", &self.tag)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Output of a sign call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResult {
    /// Identifier of the signature construction
    #[serde(rename = "algorithm")]
    pub scheme: String,
    /// Base64 DER SubjectPublicKeyInfo
    pub public_key: String,
    /// Base64 detached signature
    pub signature: String,
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// An authenticated symmetric encryption construction
pub trait SymmetricScheme: Send + Sync {
    /// Canonical scheme identifier
    fn id(&self) -> &'static str;

    /// Encrypt under a freshly generated key and nonce
    fn encrypt(&self, plaintext: &str) -> Result<EncryptionResult>;

    /// Authenticate, then decrypt
    fn decrypt(&self, input: &DecryptionInput) -> Result<String>;
}

/// A detached signature construction
pub trait SignatureScheme: Send + Sync {
    /// Canonical scheme identifier
    fn id(&self) -> &'static str;

    /// Sign under a freshly generated keypair
    fn sign(&self, message: &str) -> Result<SignatureResult>;

    /// `Ok(false)` for a well-formed triple that does not verify
    fn verify(&self, message: &str, public_key: &str, signature: &str) -> Result<bool>;
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Resolves scheme labels to implementations
///
/// Labels are matched case-insensitively against each scheme's id and
/// registered aliases.
#[derive(Clone)]
pub struct SchemeRegistry {
    symmetric: Vec<(Vec<String>, Arc<dyn SymmetricScheme>)>,
    signature: Vec<(Vec<String>, Arc<dyn SignatureScheme>)>,
}

impl SchemeRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            symmetric: Vec::new(),
            signature: Vec::new(),
        }
    }

    /// Register a symmetric scheme under its id plus `aliases`
    pub fn register_symmetric(
        &mut self,
        scheme: Arc<dyn SymmetricScheme>,
        aliases: &[&str],
    ) -> &mut Self {
        let labels = labels_for(scheme.id(), aliases);
        self.symmetric.push((labels, scheme));
        self
    }

    /// Register a signature scheme under its id plus `aliases`
    pub fn register_signature(
        &mut self,
        scheme: Arc<dyn SignatureScheme>,
        aliases: &[&str],
    ) -> &mut Self {
        let labels = labels_for(scheme.id(), aliases);
        self.signature.push((labels, scheme));
        self
    }

    /// Look up a symmetric scheme by label
    pub fn symmetric(&self, label: &str) -> Result<Arc<dyn SymmetricScheme>> {
        let wanted = label.trim().to_ascii_lowercase();
        self.symmetric
            .iter()
            .find(|(labels, _)| labels.contains(&wanted))
            .map(|(_, scheme)| scheme.clone())
            .ok_or_else(|| Error::malformed(format!("unsupported encryption scheme: {}", label)))
    }

    /// Look up a signature scheme by label
    pub fn signature(&self, label: &str) -> Result<Arc<dyn SignatureScheme>> {
        let wanted = label.trim().to_ascii_lowercase();
        self.signature
            .iter()
            .find(|(labels, _)| labels.contains(&wanted))
            .map(|(_, scheme)| scheme.clone())
            .ok_or_else(|| Error::malformed(format!("unsupported signature scheme: {}", label)))
    }
}

impl Default for SchemeRegistry {
    /// AES-GCM and Ed25519
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_symmetric(Arc::new(AesGcm), &["AES-256-GCM"])
            .register_signature(Arc::new(Ed25519), &["Ed25519-demo"]);
        registry
    }
}

fn labels_for(id: &str, aliases: &[&str]) -> Vec<String> {
    let mut labels: Vec<String> = std::iter::once(id)
        .chain(aliases.iter().copied())
        .map(|l| l.to_ascii_lowercase())
        .collect();
    labels.dedup();
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_resolves_aliases() {
        let registry = SchemeRegistry::default();
        assert_eq!(registry.symmetric("AES-GCM").unwrap().id(), AES_GCM);
        assert_eq!(registry.symmetric("aes-256-gcm").unwrap().id(), AES_GCM);
        assert_eq!(registry.symmetric(" Aes-Gcm ").unwrap().id(), AES_GCM);
        assert_eq!(registry.signature("ed25519").unwrap().id(), ED25519);
        assert_eq!(registry.signature("Ed25519-demo").unwrap().id(), ED25519);
    }

    #[test]
    fn test_unknown_scheme_is_malformed_input() {
        let registry = SchemeRegistry::default();
        assert!(matches!(
            registry.symmetric("Kyber-768"),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            registry.signature("Dilithium3"),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_empty_registry() {
        assert!(SchemeRegistry::empty().symmetric(AES_GCM).is_err());
    }

    #[test]
    fn test_encryption_result_wire_names() {
        let result = EncryptionResult {
            scheme: "AES-GCM".into(),
            ciphertext: "Y3Q=".into(),
            iv: "aXY=".into(),
            tag: "dGFn".into(),
            key: "a2V5".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["algorithm"], "AES-GCM");
        assert_eq!(json["iv"], "aXY=");
        assert_eq!(json["key"], "a2V5");
    }

    #[test]
    fn test_encryption_result_debug_redacts_key() {
        let result = AesGcm.encrypt("secret").unwrap();
        let debug = format!("{:?}", result);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&result.key));
    }

    #[test]
    fn test_signature_result_wire_names() {
        let result = Ed25519.sign("wire").unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["algorithm"], "Ed25519");
        assert!(json["publicKey"].is_string());
        assert!(json["signature"].is_string());
    }
}
