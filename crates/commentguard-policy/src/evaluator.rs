//! Policy evaluator trait

use async_trait::async_trait;
use commentguard_core::ModerationResult;

use crate::verdict::PolicyVerdict;

/// Judges a comment against operator-authored policy statements.
///
/// Callers skip this stage entirely when a website has no active policies;
/// an evaluator is only ever asked about a non-empty list.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Evaluate `text` against `policies`, in the order given
    async fn evaluate(&self, text: &str, policies: &[String]) -> ModerationResult<PolicyVerdict>;

    /// Get the evaluator name
    fn name(&self) -> &str;
}
