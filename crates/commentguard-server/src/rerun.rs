//! Backlog re-run of pending comments
//!
//! Re-moderates every pending, not manually moderated comment of a website
//! against its current active policies. Items are processed one at a time;
//! a failed item is logged and left pending, the batch carries on.

use chrono::Utc;
use commentguard_core::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::moderation::CommentModerator;
use crate::policies::{active_policy_statements, require_website};
use crate::store::Store;

/// Outcome of one re-run batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RerunReport {
    /// Comments matching the selection
    pub selected: usize,
    /// Comments that received a decision
    pub processed: usize,
    /// Comments whose moderation attempt failed; still pending
    pub failed: usize,
    /// Comments decided by an owner while the batch ran; left as the owner set them
    pub skipped: usize,
}

/// Re-runs moderation over a website's backlog
#[derive(Clone)]
pub struct RerunCoordinator {
    store: Arc<dyn Store>,
    moderator: Arc<dyn CommentModerator>,
}

impl RerunCoordinator {
    pub fn new(store: Arc<dyn Store>, moderator: Arc<dyn CommentModerator>) -> Self {
        Self { store, moderator }
    }

    /// Run one batch. Only selection or storage failures abort it.
    pub async fn rerun(&self, website_id: Uuid) -> Result<RerunReport> {
        require_website(self.store.as_ref(), website_id).await?;

        let policies = active_policy_statements(self.store.as_ref(), website_id).await?;
        let candidates = self.store.rerun_candidates(website_id).await?;

        let mut report = RerunReport {
            selected: candidates.len(),
            ..Default::default()
        };

        info!(
            website_id = %website_id,
            selected = report.selected,
            policies = policies.len(),
            "Starting moderation rerun"
        );

        for mut comment in candidates {
            let decision = match self.moderator.moderate(&comment.content, &policies).await {
                Ok(decision) => decision,
                Err(e) => {
                    error!(
                        comment_id = %comment.id,
                        stage = e.stage(),
                        error = %e,
                        "Failed to moderate comment"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            comment.apply_decision(&decision, Utc::now());
            if self.store.save_comment_if_rerun_eligible(&comment).await? {
                report.processed += 1;
            } else {
                warn!(comment_id = %comment.id, "Comment decided during rerun, keeping stored decision");
                report.skipped += 1;
            }
        }

        info!(
            website_id = %website_id,
            processed = report.processed,
            failed = report.failed,
            skipped = report.skipped,
            "Moderation rerun complete"
        );
        Ok(report)
    }
}
