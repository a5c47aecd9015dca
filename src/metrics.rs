use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct ServiceMetrics {
    submissions_stored: AtomicU64,
    history_requests: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission that made it through the full pipeline.
    pub fn record_submission(&self) {
        self.submissions_stored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served history read.
    pub fn record_history_request(&self) {
        self.history_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_stored: self.submissions_stored.load(Ordering::Relaxed),
            history_requests: self.history_requests.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of submissions persisted since startup.
    pub submissions_stored: u64,
    /// Number of history reads served since startup.
    pub history_requests: u64,
}
