//! Per-operation counters and the last-ciphertext gauge.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::jobs::OperationKind;

/// Monotonic operation counters
///
/// Incremented once per successfully completed operation. Lock-free.
#[derive(Debug, Default)]
pub struct OperationCounters {
    encrypt: AtomicU64,
    decrypt: AtomicU64,
    sign: AtomicU64,
    verify: AtomicU64,
    last_ciphertext_bytes: AtomicU64,
}

/// Point-in-time copy of [`OperationCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub encrypt: u64,
    pub decrypt: u64,
    pub sign: u64,
    pub verify: u64,
    pub last_ciphertext_bytes: u64,
}

impl OperationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: OperationKind) -> &AtomicU64 {
        match kind {
            OperationKind::Encrypt => &self.encrypt,
            OperationKind::Decrypt => &self.decrypt,
            OperationKind::Sign => &self.sign,
            OperationKind::Verify => &self.verify,
        }
    }

    /// Count one completed operation of `kind`
    pub fn increment(&self, kind: OperationKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    /// Current count for `kind`
    pub fn get(&self, kind: OperationKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    /// Overwrite the gauge with the latest ciphertext length
    pub fn set_last_ciphertext_bytes(&self, len: u64) {
        self.last_ciphertext_bytes.store(len, Ordering::Relaxed);
    }

    pub fn last_ciphertext_bytes(&self) -> u64 {
        self.last_ciphertext_bytes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            encrypt: self.get(OperationKind::Encrypt),
            decrypt: self.get(OperationKind::Decrypt),
            sign: self.get(OperationKind::Sign),
            verify: self.get(OperationKind::Verify),
            last_ciphertext_bytes: self.last_ciphertext_bytes(),
        }
    }
}
