//! Observability counters
//!
//! Failures in this system are observability events, not invocation
//! failures; these counters are the aggregate view operators alert on.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    records_processed: AtomicU64,
    records_skipped: AtomicU64,
    attachments_stored: AtomicU64,
    attachments_delivered: AtomicU64,
    notify_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "records_processed", "Metric incremented");
    }

    pub fn record_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "records_skipped", "Metric incremented");
    }

    pub fn attachment_stored(&self) {
        self.attachments_stored.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "attachments_stored", "Metric incremented");
    }

    pub fn attachment_delivered(&self) {
        self.attachments_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "attachments_delivered", "Metric incremented");
    }

    pub fn notify_failed(&self) {
        self.notify_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "notify_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_processed: self.records_processed.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            attachments_stored: self.attachments_stored.load(Ordering::Relaxed),
            attachments_delivered: self.attachments_delivered.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub records_processed: u64,
    pub records_skipped: u64,
    pub attachments_stored: u64,
    pub attachments_delivered: u64,
    pub notify_failures: u64,
}
