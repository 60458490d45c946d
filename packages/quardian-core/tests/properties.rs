//! Property-based tests for the operation core
//!
//! Keys, nonces and keypairs are random per call, so these check behavior
//! rather than bytes.

use std::sync::Arc;

use proptest::prelude::*;
use quardian_core::codec;
use quardian_core::crypto::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use quardian_core::{
    AesGcm, CryptoService, DecryptionInput, Ed25519, EncryptionResult, Error, LatencyTracker,
    MemoryJobStore, MetricsContext, SignatureScheme, SymmetricScheme,
};

fn decryption_input(result: &EncryptionResult) -> DecryptionInput {
    DecryptionInput {
        ciphertext: result.ciphertext.clone(),
        key: result.key.clone(),
        iv: result.iv.clone(),
        tag: result.tag.clone(),
    }
}

fn flip_bit(encoded: &str, bit: usize) -> String {
    let mut bytes = codec::decode("field", encoded).unwrap();
    let bit = bit % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
    codec::encode(bytes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: decrypt(encrypt(x)) == x for any UTF-8 string
    #[test]
    fn prop_encrypt_decrypt_roundtrip(text in any::<String>()) {
        let sealed = AesGcm.encrypt(&text).unwrap();
        let opened = AesGcm.decrypt(&decryption_input(&sealed)).unwrap();
        prop_assert_eq!(opened, text);
    }

    /// Property: field sizes are fixed and ciphertext matches plaintext length
    #[test]
    fn prop_encrypt_field_sizes(text in any::<String>()) {
        let sealed = AesGcm.encrypt(&text).unwrap();
        prop_assert_eq!(codec::decode("key", &sealed.key).unwrap().len(), KEY_SIZE);
        prop_assert_eq!(codec::decode("iv", &sealed.iv).unwrap().len(), NONCE_SIZE);
        prop_assert_eq!(codec::decode("tag", &sealed.tag).unwrap().len(), TAG_SIZE);
        prop_assert_eq!(
            codec::decode("ciphertext", &sealed.ciphertext).unwrap().len(),
            text.len()
        );
    }

    /// Property: any single-bit flip in iv, tag or key fails authentication
    #[test]
    fn prop_tamper_detected(text in any::<String>(), field in 0usize..4, bit in any::<usize>()) {
        let sealed = AesGcm.encrypt(&text).unwrap();
        let mut input = decryption_input(&sealed);
        match field {
            0 if !text.is_empty() => input.ciphertext = flip_bit(&input.ciphertext, bit),
            0 | 1 => input.iv = flip_bit(&input.iv, bit),
            2 => input.tag = flip_bit(&input.tag, bit),
            _ => input.key = flip_bit(&input.key, bit),
        }
        prop_assert_eq!(AesGcm.decrypt(&input), Err(Error::AuthenticationFailed));
    }

    /// Property: verify(m, sign(m)) == true
    #[test]
    fn prop_signature_roundtrip(message in any::<String>()) {
        let signed = Ed25519.sign(&message).unwrap();
        prop_assert!(Ed25519.verify(&message, &signed.public_key, &signed.signature).unwrap());
    }

    /// Property: a different message does not verify
    #[test]
    fn prop_signature_rejects_other_message(message in any::<String>(), suffix in "[a-z]{1,8}") {
        let signed = Ed25519.sign(&message).unwrap();
        let altered = format!("{}{}", message, suffix);
        prop_assert!(!Ed25519.verify(&altered, &signed.public_key, &signed.signature).unwrap());
    }

    /// Property: failed decrypts never move counters
    #[test]
    fn prop_failed_decrypt_leaves_counters(text in any::<String>(), bit in any::<usize>()) {
        let store = Arc::new(MemoryJobStore::new());
        let service = CryptoService::new(Arc::new(MetricsContext::default()), store.clone());
        let sealed = service.encrypt(&text, None).unwrap();

        let mut input = decryption_input(&sealed);
        input.tag = flip_bit(&input.tag, bit);
        prop_assert!(service.decrypt(&input, None).is_err());

        let counters = service.metrics().counters.snapshot();
        prop_assert_eq!(counters.encrypt, 1);
        prop_assert_eq!(counters.decrypt, 0);
        prop_assert_eq!(store.len(), 1);
    }
}

#[test]
fn test_latency_percentile_scenario() {
    let tracker = LatencyTracker::default();
    assert_eq!(tracker.percentile95(), 0.05);
    for i in 1..=10 {
        tracker.record_seconds(i as f64 / 100.0);
    }
    assert_eq!(tracker.percentile95(), 0.10);
}
