//! # Encryption Module
//!
//! AES-256-GCM with a detached authentication tag and a fresh key per call.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ENCRYPT / DECRYPT                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  encrypt(plaintext)                                                    │
//! │    key   ← OsRng (32 bytes)                                            │
//! │    nonce ← OsRng (12 bytes)                                            │
//! │    (ciphertext, tag) ← AES-256-GCM(key, nonce, plaintext, aad = "")    │
//! │    return base64 { ciphertext, iv, tag, key }                          │
//! │                                                                         │
//! │  decrypt(ciphertext, key, iv, tag)                                     │
//! │    decode + length-check every field        ──► MalformedInput         │
//! │    recompute tag over ciphertext, compare   ──► AuthenticationFailed   │
//! │    only then apply the keystream                                       │
//! │    UTF-8 check on the released plaintext    ──► MalformedInput         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ciphertext is exactly as long as the plaintext; the tag travels
//! separately.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce as AesNonce, Tag,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::keys::{Nonce, SymmetricKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use super::{EncryptionResult, SymmetricScheme};
use crate::codec;
use crate::error::{Error, Result};

/// Canonical identifier of the AES-256-GCM construction
pub const AES_GCM: &str = "AES-GCM";

/// Caller-supplied fields for a decrypt call, all base64
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptionInput {
    /// Ciphertext without the tag
    pub ciphertext: String,
    /// 32-byte key returned by the matching encrypt call
    pub key: String,
    /// 12-byte nonce
    pub iv: String,
    /// 16-byte authentication tag
    pub tag: String,
}

/// Encrypt bytes under `key`/`nonce`, returning `(ciphertext, tag)`
pub fn seal(key: &SymmetricKey, nonce: &Nonce, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_SIZE])> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::CryptoFailure(format!("Invalid key: {}", e)))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(AesNonce::from_slice(nonce.as_bytes()), b"", &mut buffer)
        .map_err(|e| Error::CryptoFailure(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Verify `tag` over `ciphertext`, then decrypt
///
/// No plaintext is produced unless the tag verifies. Every verification
/// failure collapses into [`Error::AuthenticationFailed`].
pub fn open(
    key: &SymmetricKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::CryptoFailure(format!("Invalid key: {}", e)))?;

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            AesNonce::from_slice(nonce.as_bytes()),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::AuthenticationFailed)?;

    Ok(buffer)
}

/// The AES-256-GCM symmetric scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcm;

impl SymmetricScheme for AesGcm {
    fn id(&self) -> &'static str {
        AES_GCM
    }

    fn encrypt(&self, plaintext: &str) -> Result<EncryptionResult> {
        let key = SymmetricKey::generate();
        let nonce = Nonce::random();
        let (ciphertext, tag) = seal(&key, &nonce, plaintext.as_bytes())?;

        Ok(EncryptionResult {
            scheme: AES_GCM.to_string(),
            ciphertext: codec::encode(&ciphertext),
            iv: codec::encode(nonce.as_bytes()),
            tag: codec::encode(tag),
            key: codec::encode(key.as_bytes()),
        })
    }

    fn decrypt(&self, input: &DecryptionInput) -> Result<String> {
        let ciphertext = codec::decode("ciphertext", &input.ciphertext)?;
        let key_bytes = codec::decode_secret::<KEY_SIZE>("key", &input.key)?;
        let nonce = Nonce(codec::decode_fixed::<NONCE_SIZE>("iv", &input.iv)?);
        let tag = codec::decode_fixed::<TAG_SIZE>("tag", &input.tag)?;

        let key = SymmetricKey::from_bytes(*key_bytes);
        let plaintext = Zeroizing::new(open(&key, &nonce, &ciphertext, &tag)?);

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| Error::malformed("decrypted plaintext is not valid UTF-8"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input_from(result: &EncryptionResult) -> DecryptionInput {
        DecryptionInput {
            ciphertext: result.ciphertext.clone(),
            key: result.key.clone(),
            iv: result.iv.clone(),
            tag: result.tag.clone(),
        }
    }

    fn flip_first_bit(encoded: &str) -> String {
        let mut bytes = codec::decode("field", encoded).unwrap();
        bytes[0] ^= 0x01;
        codec::encode(bytes)
    }

    #[test]
    fn test_seal_open_basic() {
        let key = SymmetricKey::from_bytes([42u8; 32]);
        let nonce = Nonce([1u8; 12]);

        let (ciphertext, tag) = seal(&key, &nonce, b"Hello, World!").unwrap();
        assert_eq!(ciphertext.len(), 13);

        let plaintext = open(&key, &nonce, &ciphertext, &tag).unwrap();
        assert_eq!(plaintext, b"Hello, World!");
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let result = AesGcm.encrypt("attack at dawn").unwrap();
        assert_eq!(result.scheme, "AES-GCM");
        assert_eq!(AesGcm.decrypt(&input_from(&result)).unwrap(), "attack at dawn");
    }

    #[test]
    fn test_encrypt_empty_plaintext() {
        let result = AesGcm.encrypt("").unwrap();
        assert_eq!(result.ciphertext, "");
        assert_eq!(codec::decode("tag", &result.tag).unwrap().len(), TAG_SIZE);
        assert_eq!(AesGcm.decrypt(&input_from(&result)).unwrap(), "");
    }

    #[test]
    fn test_encrypt_multibyte_and_nul() {
        let text = "nul\0byte · ключ · 鍵 · 🔑";
        let result = AesGcm.encrypt(text).unwrap();
        assert_eq!(AesGcm.decrypt(&input_from(&result)).unwrap(), text);
    }

    #[test]
    fn test_field_lengths() {
        let result = AesGcm.encrypt("sizes").unwrap();
        assert_eq!(codec::decode("key", &result.key).unwrap().len(), KEY_SIZE);
        assert_eq!(codec::decode("iv", &result.iv).unwrap().len(), NONCE_SIZE);
        assert_eq!(codec::decode("tag", &result.tag).unwrap().len(), TAG_SIZE);
        assert_eq!(codec::decode("ciphertext", &result.ciphertext).unwrap().len(), 5);
    }

    #[test]
    fn test_fresh_key_and_nonce_per_call() {
        let a = AesGcm.encrypt("same").unwrap();
        let b = AesGcm.encrypt("same").unwrap();
        assert_ne!(a.key, b.key);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_tampered_fields_fail_authentication() {
        let result = AesGcm.encrypt("integrity matters").unwrap();

        let mut tampered = input_from(&result);
        tampered.ciphertext = flip_first_bit(&result.ciphertext);
        assert_eq!(AesGcm.decrypt(&tampered), Err(Error::AuthenticationFailed));

        let mut tampered = input_from(&result);
        tampered.iv = flip_first_bit(&result.iv);
        assert_eq!(AesGcm.decrypt(&tampered), Err(Error::AuthenticationFailed));

        let mut tampered = input_from(&result);
        tampered.tag = flip_first_bit(&result.tag);
        assert_eq!(AesGcm.decrypt(&tampered), Err(Error::AuthenticationFailed));

        let mut tampered = input_from(&result);
        tampered.key = flip_first_bit(&result.key);
        assert_eq!(AesGcm.decrypt(&tampered), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let a = AesGcm.encrypt("mine").unwrap();
        let b = AesGcm.encrypt("yours").unwrap();

        let mut input = input_from(&a);
        input.key = b.key;
        assert_eq!(AesGcm.decrypt(&input), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_malformed_fields() {
        let result = AesGcm.encrypt("shape").unwrap();

        let mut input = input_from(&result);
        input.key = codec::encode([0u8; 16]);
        assert!(matches!(AesGcm.decrypt(&input), Err(Error::MalformedInput(_))));

        let mut input = input_from(&result);
        input.iv = codec::encode([0u8; 16]);
        assert!(matches!(AesGcm.decrypt(&input), Err(Error::MalformedInput(_))));

        let mut input = input_from(&result);
        input.tag = codec::encode([0u8; 12]);
        assert!(matches!(AesGcm.decrypt(&input), Err(Error::MalformedInput(_))));

        let mut input = input_from(&result);
        input.ciphertext = "%%%".to_string();
        assert!(matches!(AesGcm.decrypt(&input), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_authenticated_non_utf8_plaintext_is_malformed() {
        let key = SymmetricKey::from_bytes([3u8; 32]);
        let nonce = Nonce([4u8; 12]);
        let (ciphertext, tag) = seal(&key, &nonce, &[0xff, 0xfe]).unwrap();

        let input = DecryptionInput {
            ciphertext: codec::encode(ciphertext),
            key: codec::encode(key.as_bytes()),
            iv: codec::encode(nonce.as_bytes()),
            tag: codec::encode(tag),
        };
        assert!(matches!(AesGcm.decrypt(&input), Err(Error::MalformedInput(_))));
    }
}
