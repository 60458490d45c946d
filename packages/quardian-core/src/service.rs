//! # Crypto Service
//!
//! The single entry point the HTTP layer calls. Each operation resolves a
//! scheme, runs it, and only when that succeeded hands a record to the sink
//! and updates metrics.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         OPERATION PIPELINE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. resolve scheme label          (MalformedInput on unknown label)    │
//! │  2. run engine                    (any error returns here)             │
//! │  3. JobSink::append(record)       (Storage error returns here)         │
//! │  4. counters += 1, gauge          (encrypt sets last ciphertext size)  │
//! │  5. latency.record(elapsed)       (encrypt and decrypt only)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure at any step before 4 leaves counters and latency untouched.

use std::sync::Arc;
use std::time::Instant;

use crate::codec;
use crate::crypto::{
    DecryptionInput, EncryptionResult, SchemeRegistry, SignatureResult, AES_GCM, ED25519,
};
use crate::error::Result;
use crate::jobs::{JobSink, JobStats, OperationKind, OperationRecord};
use crate::metrics::MetricsContext;

/// Scheme dispatch plus side effects for completed operations
#[derive(Clone)]
pub struct CryptoService {
    registry: SchemeRegistry,
    metrics: Arc<MetricsContext>,
    sink: Arc<dyn JobSink>,
}

impl CryptoService {
    /// Service with the default registry
    pub fn new(metrics: Arc<MetricsContext>, sink: Arc<dyn JobSink>) -> Self {
        Self::with_registry(SchemeRegistry::default(), metrics, sink)
    }

    pub fn with_registry(
        registry: SchemeRegistry,
        metrics: Arc<MetricsContext>,
        sink: Arc<dyn JobSink>,
    ) -> Self {
        Self {
            registry,
            metrics,
            sink,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsContext> {
        &self.metrics
    }

    pub fn sink(&self) -> &Arc<dyn JobSink> {
        &self.sink
    }

    /// Encrypt `plaintext` under the scheme labelled `scheme` (default AES-GCM)
    pub fn encrypt(&self, plaintext: &str, scheme: Option<&str>) -> Result<EncryptionResult> {
        let started = Instant::now();
        let engine = self.registry.symmetric(scheme.unwrap_or(AES_GCM))?;
        let result = engine.encrypt(plaintext)?;
        let ciphertext_len = codec::decode("ciphertext", &result.ciphertext)?.len();

        self.sink.append(OperationRecord::encrypt(
            engine.id(),
            plaintext.len(),
            ciphertext_len,
        ))?;

        let counters = &self.metrics.counters;
        counters.increment(OperationKind::Encrypt);
        counters.set_last_ciphertext_bytes(ciphertext_len as u64);
        self.metrics.latency.record(started.elapsed());

        Ok(result)
    }

    /// Authenticate and decrypt; `scheme` defaults to AES-GCM
    pub fn decrypt(&self, input: &DecryptionInput, scheme: Option<&str>) -> Result<String> {
        let started = Instant::now();
        let engine = self.registry.symmetric(scheme.unwrap_or(AES_GCM))?;
        let plaintext = engine.decrypt(input)?;
        let ciphertext_len = codec::decode("ciphertext", &input.ciphertext)?.len();

        self.sink.append(OperationRecord::decrypt(
            engine.id(),
            ciphertext_len,
            plaintext.len(),
        ))?;

        self.metrics.counters.increment(OperationKind::Decrypt);
        self.metrics.latency.record(started.elapsed());

        Ok(plaintext)
    }

    /// Sign `message` with a fresh Ed25519 keypair
    pub fn sign(&self, message: &str) -> Result<SignatureResult> {
        let engine = self.registry.signature(ED25519)?;
        let result = engine.sign(message)?;
        let signature_len = codec::decode("signature", &result.signature)?.len();

        self.sink.append(OperationRecord::sign(
            engine.id(),
            message.len(),
            signature_len,
        ))?;
        self.metrics.counters.increment(OperationKind::Sign);

        Ok(result)
    }

    /// Check a detached signature; `Ok(false)` counts as a completed verify
    pub fn verify(&self, message: &str, public_key: &str, signature: &str) -> Result<bool> {
        let engine = self.registry.signature(ED25519)?;
        let valid = engine.verify(message, public_key, signature)?;

        self.sink
            .append(OperationRecord::verify(engine.id(), message.len(), valid))?;
        self.metrics.counters.increment(OperationKind::Verify);

        Ok(valid)
    }

    /// Aggregate counts from the sink
    pub fn stats(&self) -> Result<JobStats> {
        JobStats::collect(self.sink.as_ref())
    }
}

// ============================================================================
// TESTS
// ============================================================================
