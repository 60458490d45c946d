//! # Quardian Core
//!
//! The cryptographic operation core behind the Quardian demo service:
//! ephemeral-key authenticated encryption, detached signatures, and the
//! metrics that observe them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        QUARDIAN CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │                       ┌──────────────────┐                              │
//! │    plain values ─────►│  CryptoService   │─────► result records         │
//! │                       └────────┬─────────┘                              │
//! │            ┌───────────────────┼───────────────────┐                    │
//! │            ▼                   ▼                   ▼                    │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐          │
//! │  │     Crypto      │  │     Metrics     │  │      Jobs       │          │
//! │  │                 │  │                 │  │                 │          │
//! │  │ - AES-256-GCM   │  │ - Counters      │  │ - Records       │          │
//! │  │ - Ed25519       │  │ - Gauge         │  │ - JobSink       │          │
//! │  │ - Registry      │  │ - p95 latency   │  │ - JobStats      │          │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error taxonomy shared by every operation
//! - [`codec`] - Base64 encoding of binary fields
//! - [`crypto`] - Schemes, keys, and result records
//! - [`metrics`] - Operation counters and the latency window
//! - [`jobs`] - Operation records and the storage seam
//! - [`service`] - The operation pipeline callers use
//!
//! The core performs no logging and no network or disk I/O of its own.
//! Persistence goes through whatever [`JobSink`] the caller supplies.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use quardian_core::{CryptoService, DecryptionInput, MemoryJobStore, MetricsContext};
//!
//! let service = CryptoService::new(
//!     Arc::new(MetricsContext::default()),
//!     Arc::new(MemoryJobStore::new()),
//! );
//!
//! let sealed = service.encrypt("attack at dawn", None).unwrap();
//! let input = DecryptionInput {
//!     ciphertext: sealed.ciphertext,
//!     key: sealed.key,
//!     iv: sealed.iv,
//!     tag: sealed.tag,
//! };
//! assert_eq!(service.decrypt(&input, None).unwrap(), "attack at dawn");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod codec;
pub mod crypto;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod service;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{
    AesGcm, DecryptionInput, Ed25519, EncryptionResult, SchemeRegistry, SignatureResult,
    SignatureScheme, SymmetricScheme,
};
pub use error::{Error, Result};
pub use jobs::{JobSink, JobStats, MemoryJobStore, OperationKind, OperationRecord};
pub use metrics::{CounterSnapshot, LatencyTracker, MetricsContext, OperationCounters};
pub use service::CryptoService;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
