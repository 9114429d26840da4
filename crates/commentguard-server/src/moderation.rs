//! Moderation orchestrator
//!
//! Combines the safety classifier and the policy evaluator into one decision.
//! The classifier runs first and its veto is absolute: a flagged comment is
//! rejected without consulting the operator's policies. Clean comments are
//! then judged against the active policies, if there are any.

use async_trait::async_trait;
use commentguard_classifiers::{OpenAiModerationClient, SafetyClassifier};
use commentguard_core::{Decision, ModerationResult, ProviderSettings};
use commentguard_policy::{OpenAiPolicyEvaluator, PolicyEvaluator};
use commentguard_telemetry::{DecisionOutcome, ModerationMetrics};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Produces a decision for one comment text
#[async_trait]
pub trait CommentModerator: Send + Sync {
    /// Moderate `text` against the website's active policy statements.
    ///
    /// Errors are hard failures of either stage; callers decide what they
    /// mean for the comment.
    async fn moderate(&self, text: &str, policies: &[String]) -> ModerationResult<Decision>;
}

/// Two-stage moderation over a classifier and a policy evaluator
pub struct ModerationService {
    classifier: Arc<dyn SafetyClassifier>,
    evaluator: Arc<dyn PolicyEvaluator>,
    metrics: ModerationMetrics,
}

impl ModerationService {
    pub fn new(classifier: Arc<dyn SafetyClassifier>, evaluator: Arc<dyn PolicyEvaluator>) -> Self {
        Self {
            classifier,
            evaluator,
            metrics: ModerationMetrics::new(),
        }
    }

    /// Share a metrics collector with the rest of the service
    pub fn with_metrics(mut self, metrics: ModerationMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the provider-backed service. Both clients share one HTTP client
    /// and one settings value.
    pub fn from_settings(http: reqwest::Client, settings: Arc<ProviderSettings>) -> Self {
        let classifier = OpenAiModerationClient::new(http.clone(), settings.clone());
        let evaluator = OpenAiPolicyEvaluator::new(http, settings);
        Self::new(Arc::new(classifier), Arc::new(evaluator))
    }

    pub fn metrics(&self) -> &ModerationMetrics {
        &self.metrics
    }

    async fn decide(&self, text: &str, policies: &[String]) -> ModerationResult<(Decision, DecisionOutcome)> {
        let classification = self.classifier.classify(text).await?;
        if classification.flagged {
            let labels = classification.labels();
            debug!(
                classifier = self.classifier.name(),
                categories = ?labels,
                "Comment flagged by safety classifier"
            );
            return Ok((
                Decision::classifier_rejection(labels),
                DecisionOutcome::RejectedByClassifier,
            ));
        }

        if policies.is_empty() {
            return Ok((Decision::approve(), DecisionOutcome::Approved));
        }

        let verdict = self.evaluator.evaluate(text, policies).await?;
        if verdict.approved {
            Ok((Decision::approve(), DecisionOutcome::Approved))
        } else {
            debug!(
                evaluator = self.evaluator.name(),
                reason = %verdict.reason,
                "Comment rejected by policy evaluator"
            );
            Ok((
                Decision::policy_rejection(&verdict.reason),
                DecisionOutcome::RejectedByPolicy,
            ))
        }
    }
}

#[async_trait]
impl CommentModerator for ModerationService {
    async fn moderate(&self, text: &str, policies: &[String]) -> ModerationResult<Decision> {
        let start = Instant::now();
        let result = self.decide(text, policies).await;
        let latency_us = start.elapsed().as_micros() as u64;

        match result {
            Ok((decision, outcome)) => {
                self.metrics.record(outcome, latency_us);
                Ok(decision)
            }
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Moderation attempt failed");
                self.metrics.record_error(e.stage(), latency_us);
                Err(e)
            }
        }
    }
}

/// HTTP client for provider calls, with the configured timeout
pub fn build_http_client(settings: &ProviderSettings) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
}
