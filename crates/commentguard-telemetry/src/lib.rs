//! CommentGuard Telemetry
//!
//! Provides:
//! - A hash-chained audit trail of owner actions (policy edits, reruns,
//!   manual decisions)
//! - Moderation decision metrics, exported through the `metrics` facade

pub mod audit;
pub mod metrics;

pub use audit::{AuditAction, AuditEvent, AuditTrail};
pub use metrics::{DecisionOutcome, MetricsSnapshot, ModerationMetrics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditAction, AuditEvent, AuditTrail};
    pub use crate::metrics::{DecisionOutcome, ModerationMetrics};
}
