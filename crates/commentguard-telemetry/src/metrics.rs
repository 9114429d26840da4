//! Moderation metrics collection and reporting
//!
//! Counters are kept locally for snapshots and mirrored to the global
//! `metrics` recorder for Prometheus export.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// How a moderation attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approved,
    RejectedByClassifier,
    RejectedByPolicy,
    Error,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::RejectedByClassifier => "rejected_classifier",
            Self::RejectedByPolicy => "rejected_policy",
            Self::Error => "error",
        }
    }
}

/// Metrics collector for moderation decisions
#[derive(Clone, Default)]
pub struct ModerationMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    approved: AtomicU64,
    rejected_classifier: AtomicU64,
    rejected_policy: AtomicU64,
    errors: AtomicU64,
    total_latency_us: AtomicU64,
}

impl ModerationMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one moderation attempt
    pub fn record(&self, outcome: DecisionOutcome, latency_us: u64) {
        let counter = match outcome {
            DecisionOutcome::Approved => &self.inner.approved,
            DecisionOutcome::RejectedByClassifier => &self.inner.rejected_classifier,
            DecisionOutcome::RejectedByPolicy => &self.inner.rejected_policy,
            DecisionOutcome::Error => &self.inner.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);

        ::metrics::counter!("commentguard_decisions_total", "outcome" => outcome.as_str())
            .increment(1);
        ::metrics::histogram!("commentguard_moderation_latency_us").record(latency_us as f64);
    }

    /// Record a failed stage
    pub fn record_error(&self, stage: &'static str, latency_us: u64) {
        self.record(DecisionOutcome::Error, latency_us);
        ::metrics::counter!("commentguard_moderation_errors_total", "stage" => stage).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            approved: self.inner.approved.load(Ordering::Relaxed),
            rejected_classifier: self.inner.rejected_classifier.load(Ordering::Relaxed),
            rejected_policy: self.inner.rejected_policy.load(Ordering::Relaxed),
            errors: self.inner.errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub approved: u64,
    pub rejected_classifier: u64,
    pub rejected_policy: u64,
    pub errors: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Attempts recorded, errors included
    pub fn total(&self) -> u64 {
        self.approved + self.rejected_classifier + self.rejected_policy + self.errors
    }

    /// Average latency per attempt in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.total_latency_us as f64 / total as f64
        }
    }
}
