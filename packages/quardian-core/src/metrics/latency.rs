//! Operation latency samples and the p95 statistic.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

/// Returned by [`LatencyTracker::percentile95`] when no samples exist
pub const DEFAULT_P95_SECONDS: f64 = 0.05;

/// Default number of samples retained
pub const DEFAULT_LATENCY_WINDOW: usize = 10_000;

/// Append-only window of duration samples, in seconds
///
/// Once `capacity` samples are held, each new sample evicts the oldest.
#[derive(Debug)]
pub struct LatencyTracker {
    samples: Mutex<VecDeque<f64>>,
    capacity: usize,
}

impl LatencyTracker {
    /// Create a tracker retaining at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Record an elapsed duration
    pub fn record(&self, elapsed: Duration) {
        self.record_seconds(elapsed.as_secs_f64());
    }

    /// Record a duration in seconds; negative or non-finite values are dropped
    pub fn record_seconds(&self, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            return;
        }
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(seconds);
    }

    /// 95th percentile of the current window
    ///
    /// Sorts a snapshot ascending and returns the element at 0-based index
    /// `floor(0.95 * n)`, clamped to `n - 1`. With ten samples that is index
    /// 9, the largest. An empty window yields [`DEFAULT_P95_SECONDS`].
    pub fn percentile95(&self) -> f64 {
        let mut snapshot: Vec<f64> = self.samples.lock().iter().copied().collect();
        if snapshot.is_empty() {
            return DEFAULT_P95_SECONDS;
        }
        snapshot.sort_by(f64::total_cmp);
        let index = ((0.95 * snapshot.len() as f64).floor() as usize).min(snapshot.len() - 1);
        snapshot[index]
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Whether no samples are held
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Maximum number of samples retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW)
    }
}
