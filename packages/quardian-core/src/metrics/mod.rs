//! # Metrics Context
//!
//! Process-wide operation metrics, owned by an explicitly constructed
//! [`MetricsContext`] rather than global statics. The server creates one at
//! startup and shares it through an `Arc` handle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         METRICS CONTEXT                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  OperationCounters   encrypt │ decrypt │ sign │ verify   (AtomicU64)   │
//! │                      last_ciphertext_bytes gauge         (AtomicU64)   │
//! │                                                                         │
//! │  LatencyTracker      bounded window of encrypt/decrypt durations       │
//! │                      (one short mutex section per sample)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Updates happen after the cryptographic work for a call has finished, so
//! a contended metrics write never delays a key or nonce being generated.

mod counters;
mod latency;

pub use counters::{CounterSnapshot, OperationCounters};
pub use latency::{LatencyTracker, DEFAULT_LATENCY_WINDOW, DEFAULT_P95_SECONDS};

/// Counters, gauge and latency window for one process
#[derive(Debug, Default)]
pub struct MetricsContext {
    pub counters: OperationCounters,
    pub latency: LatencyTracker,
}

impl MetricsContext {
    /// Create a context whose latency window holds `latency_window` samples
    pub fn new(latency_window: usize) -> Self {
        Self {
            counters: OperationCounters::new(),
            latency: LatencyTracker::new(latency_window),
        }
    }
}
