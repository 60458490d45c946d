//! # Job Records
//!
//! Metadata about completed operations, handed to a [`JobSink`] for
//! persistence. Records never contain plaintext, ciphertext or key material,
//! only sizes.
//!
//! ```text
//! CryptoService ──(success)──► OperationRecord ──► JobSink::append
//!                                                       │
//!            JobStats::collect ◄── JobSink::count(kind) ┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

// ============================================================================
// OPERATION KIND
// ============================================================================

/// The four operations the service performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Encrypt,
        OperationKind::Decrypt,
        OperationKind::Sign,
        OperationKind::Verify,
    ];

    /// Storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Encrypt => "encrypt",
            OperationKind::Decrypt => "decrypt",
            OperationKind::Sign => "sign",
            OperationKind::Verify => "verify",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// OPERATION RECORD
// ============================================================================

/// Metadata for one completed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub id: Uuid,
    pub kind: OperationKind,
    pub scheme: String,
    pub input_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size_bytes: Option<u64>,
    /// Only present on verify records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    fn new(kind: OperationKind, scheme: &str, input: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            scheme: scheme.to_string(),
            input_size_bytes: input as u64,
            output_size_bytes: None,
            verified: None,
            timestamp: Utc::now(),
        }
    }

    /// Plaintext bytes in, ciphertext bytes out
    pub fn encrypt(scheme: &str, plaintext_len: usize, ciphertext_len: usize) -> Self {
        Self {
            output_size_bytes: Some(ciphertext_len as u64),
            ..Self::new(OperationKind::Encrypt, scheme, plaintext_len)
        }
    }

    /// Ciphertext bytes in, plaintext bytes out
    pub fn decrypt(scheme: &str, ciphertext_len: usize, plaintext_len: usize) -> Self {
        Self {
            output_size_bytes: Some(plaintext_len as u64),
            ..Self::new(OperationKind::Decrypt, scheme, ciphertext_len)
        }
    }

    /// Message bytes in, signature bytes out
    pub fn sign(scheme: &str, message_len: usize, signature_len: usize) -> Self {
        Self {
            output_size_bytes: Some(signature_len as u64),
            ..Self::new(OperationKind::Sign, scheme, message_len)
        }
    }

    /// Message bytes in, no output size
    pub fn verify(scheme: &str, message_len: usize, verified: bool) -> Self {
        Self {
            verified: Some(verified),
            ..Self::new(OperationKind::Verify, scheme, message_len)
        }
    }
}

// ============================================================================
// SINK
// ============================================================================

/// Durable append of operation records
///
/// Implementations must be safe to call from many request handlers at once.
pub trait JobSink: Send + Sync {
    /// Take ownership of a record
    fn append(&self, record: OperationRecord) -> Result<()>;

    /// Number of records stored for `kind`
    fn count(&self, kind: OperationKind) -> Result<u64>;
}

/// In-memory [`JobSink`]
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    records: Mutex<Vec<OperationRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record, oldest first
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl JobSink for MemoryJobStore {
    fn append(&self, record: OperationRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }

    fn count(&self, kind: OperationKind) -> Result<u64> {
        Ok(self.records.lock().iter().filter(|r| r.kind == kind).count() as u64)
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Aggregate counts read back from a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JobStats {
    pub encrypts: u64,
    pub decrypts: u64,
    pub signs: u64,
    pub verifies: u64,
    pub efficiency: f64,
}

impl JobStats {
    /// Query `sink` for every kind and derive efficiency
    pub fn collect(sink: &dyn JobSink) -> Result<Self> {
        Ok(Self::from_counts(
            sink.count(OperationKind::Encrypt)?,
            sink.count(OperationKind::Decrypt)?,
            sink.count(OperationKind::Sign)?,
            sink.count(OperationKind::Verify)?,
        ))
    }

    pub fn from_counts(encrypts: u64, decrypts: u64, signs: u64, verifies: u64) -> Self {
        Self {
            encrypts,
            decrypts,
            signs,
            verifies,
            efficiency: efficiency(encrypts, verifies),
        }
    }
}

/// `encrypts / (encrypts + verifies)`, with a zero denominator treated as 1
pub fn efficiency(encrypts: u64, verifies: u64) -> f64 {
    let denominator = match encrypts.saturating_add(verifies) {
        0 => 1,
        n => n,
    };
    encrypts as f64 / denominator as f64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let labels: Vec<&str> = OperationKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(labels, ["encrypt", "decrypt", "sign", "verify"]);
        assert_eq!(OperationKind::Sign.to_string(), "sign");
        assert_eq!(
            serde_json::to_string(&OperationKind::Verify).unwrap(),
            "\"verify\""
        );
    }

    #[test]
    fn test_record_sizes() {
        let enc = OperationRecord::encrypt("AES-GCM", 5, 5);
        assert_eq!(enc.kind, OperationKind::Encrypt);
        assert_eq!(enc.input_size_bytes, 5);
        assert_eq!(enc.output_size_bytes, Some(5));
        assert_eq!(enc.verified, None);

        let ver = OperationRecord::verify("Ed25519", 11, false);
        assert_eq!(ver.output_size_bytes, None);
        assert_eq!(ver.verified, Some(false));
    }

    #[test]
    fn test_record_ids_unique() {
        let a = OperationRecord::sign("Ed25519", 1, 64);
        let b = OperationRecord::sign("Ed25519", 1, 64);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_record_json_omits_absent_fields() {
        let json = serde_json::to_value(OperationRecord::verify("Ed25519", 3, true)).unwrap();
        assert_eq!(json["kind"], "verify");
        assert_eq!(json["inputSizeBytes"], 3);
        assert_eq!(json["verified"], true);
        assert!(json.get("outputSizeBytes").is_none());
    }

    #[test]
    fn test_memory_store_counts_by_kind() {
        let store = MemoryJobStore::new();
        store.append(OperationRecord::encrypt("AES-GCM", 1, 1)).unwrap();
        store.append(OperationRecord::encrypt("AES-GCM", 2, 2)).unwrap();
        store.append(OperationRecord::verify("Ed25519", 2, true)).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.count(OperationKind::Encrypt).unwrap(), 2);
        assert_eq!(store.count(OperationKind::Decrypt).unwrap(), 0);
        assert_eq!(store.count(OperationKind::Verify).unwrap(), 1);
    }

    #[test]
    fn test_efficiency_zero_denominator() {
        assert_eq!(efficiency(0, 0), 0.0);
        assert_eq!(JobStats::collect(&MemoryJobStore::new()).unwrap().efficiency, 0.0);
    }

    #[test]
    fn test_efficiency_ratio() {
        assert_eq!(efficiency(3, 1), 0.75);
        assert_eq!(efficiency(4, 0), 1.0);
        assert_eq!(efficiency(0, 7), 0.0);
    }

    #[test]
    fn test_collect() {
        let store = MemoryJobStore::new();
        store.append(OperationRecord::encrypt("AES-GCM", 1, 1)).unwrap();
        store.append(OperationRecord::decrypt("AES-GCM", 1, 1)).unwrap();
        store.append(OperationRecord::sign("Ed25519", 1, 64)).unwrap();

        let stats = JobStats::collect(&store).unwrap();
        assert_eq!(
            stats,
            JobStats {
                encrypts: 1,
                decrypts: 1,
                signs: 1,
                verifies: 0,
                efficiency: 1.0,
            }
        );
    }
}
