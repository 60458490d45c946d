//! # Digital Signatures Module
//!
//! Ed25519 detached signatures over a fresh keypair per call.
//!
//! ## Signature Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SIGN / VERIFY                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  sign(message)                                                         │
//! │    keypair ← Ed25519::generate(OsRng)                                  │
//! │    signature ← Sign(keypair.secret, message)    (64 bytes)             │
//! │    drop(keypair.secret)                          (zeroized)            │
//! │    return base64 { publicKey: SPKI DER, signature }                    │
//! │                                                                         │
//! │  verify(message, publicKey, signature)                                 │
//! │    decode SPKI / 64-byte signature     ──► MalformedInput              │
//! │    Verify(publicKey, message, signature) ──► true | false              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ed25519 signing is deterministic: nothing random is consumed at signing
//! time, only at key generation.

use ed25519_dalek::{Signature, Signer, Verifier};

use super::keys::{public_key_from_spki, public_key_to_spki, SigningKeyPair};
use super::{SignatureResult, SignatureScheme};
use crate::codec;
use crate::error::Result;

/// Canonical identifier of the Ed25519 construction
pub const ED25519: &str = "Ed25519";

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// The Ed25519 signature scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519;

impl SignatureScheme for Ed25519 {
    fn id(&self) -> &'static str {
        ED25519
    }

    fn sign(&self, message: &str) -> Result<SignatureResult> {
        let (public_key, signature) = {
            let keypair = SigningKeyPair::generate();
            let signature = keypair.signing_key().sign(message.as_bytes());
            (public_key_to_spki(&keypair.verifying_key())?, signature)
        };

        Ok(SignatureResult {
            scheme: ED25519.to_string(),
            public_key: codec::encode(public_key),
            signature: codec::encode(signature.to_bytes()),
        })
    }

    fn verify(&self, message: &str, public_key: &str, signature: &str) -> Result<bool> {
        let der = codec::decode("publicKey", public_key)?;
        let verifying_key = public_key_from_spki(&der)?;
        let sig_bytes = codec::decode_fixed::<SIGNATURE_SIZE>("signature", signature)?;
        let sig = Signature::from_bytes(&sig_bytes);

        Ok(verifying_key.verify(message.as_bytes(), &sig).is_ok())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SPKI_PUBLIC_KEY_SIZE;
    use crate::error::Error;

    #[test]
    fn test_sign_verify() {
        let result = Ed25519.sign("Hello, World!").unwrap();
        assert_eq!(result.scheme, "Ed25519");
        assert!(Ed25519
            .verify("Hello, World!", &result.public_key, &result.signature)
            .unwrap());
    }

    #[test]
    fn test_encoded_sizes() {
        let result = Ed25519.sign("sizes").unwrap();
        assert_eq!(
            codec::decode("publicKey", &result.public_key).unwrap().len(),
            SPKI_PUBLIC_KEY_SIZE
        );
        assert_eq!(
            codec::decode("signature", &result.signature).unwrap().len(),
            SIGNATURE_SIZE
        );
    }

    #[test]
    fn test_fresh_keypair_per_call() {
        let a = Ed25519.sign("same message").unwrap();
        let b = Ed25519.sign("same message").unwrap();
        assert_ne!(a.public_key, b.public_key);

        assert!(Ed25519.verify("same message", &a.public_key, &a.signature).unwrap());
        assert!(Ed25519.verify("same message", &b.public_key, &b.signature).unwrap());
    }

    #[test]
    fn test_verify_wrong_message_is_false() {
        let result = Ed25519.sign("Hello, World!").unwrap();
        let valid = Ed25519
            .verify("Wrong message!", &result.public_key, &result.signature)
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_verify_cross_call_key_is_false() {
        let a = Ed25519.sign("Hello").unwrap();
        let b = Ed25519.sign("Hello").unwrap();
        assert!(!Ed25519.verify("Hello", &b.public_key, &a.signature).unwrap());
    }

    #[test]
    fn test_verify_empty_message() {
        let result = Ed25519.sign("").unwrap();
        assert!(Ed25519.verify("", &result.public_key, &result.signature).unwrap());
    }

    #[test]
    fn test_verify_malformed_inputs() {
        let result = Ed25519.sign("Hello").unwrap();

        let err = Ed25519.verify("Hello", "???", &result.signature).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        let short_sig = codec::encode([0u8; 63]);
        let err = Ed25519.verify("Hello", &result.public_key, &short_sig).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        let not_spki = codec::encode([1u8; 44]);
        let err = Ed25519.verify("Hello", &not_spki, &result.signature).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }
}
