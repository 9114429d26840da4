//! OpenAI moderation endpoint client
//!
//! Request:
//! ```text
//! POST {base}/moderations
//! {"input": "comment text", "model": "omni-moderation-latest"}
//! ```
//! Only the first entry of `results` is read: its `flagged` bit and its
//! `categories` map keyed by taxonomy label.

use async_trait::async_trait;
use commentguard_core::{
    provider_error_message, ModerationError, ModerationResult, ProviderSettings, UpstreamError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::category::Category;
use crate::classifier::{Classification, SafetyClassifier};

/// Safety classifier backed by the provider's moderation endpoint
#[derive(Clone)]
pub struct OpenAiModerationClient {
    http: reqwest::Client,
    settings: Arc<ProviderSettings>,
}

impl OpenAiModerationClient {
    /// Create a client sharing an HTTP connection pool
    pub fn new(http: reqwest::Client, settings: Arc<ProviderSettings>) -> Self {
        Self { http, settings }
    }

    async fn request(&self, text: &str) -> ModerationResult<ModerationResponse> {
        let api_key = self.settings.bearer()?;
        let url = self.settings.endpoint("moderations");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&ModerationRequest {
                input: text,
                model: &self.settings.classifier_model,
            })
            .send()
            .await
            .map_err(|e| classifier_error(UpstreamError::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Moderation API error: Status {}, Body: {}",
                status.as_u16(),
                body
            );
            return Err(classifier_error(UpstreamError::status(
                status.as_u16(),
                provider_error_message(&body),
            )));
        }

        response
            .json::<ModerationResponse>()
            .await
            .map_err(|e| classifier_error(UpstreamError::Malformed(e.to_string())))
    }
}

#[async_trait]
impl SafetyClassifier for OpenAiModerationClient {
    async fn classify(&self, text: &str) -> ModerationResult<Classification> {
        let start = Instant::now();
        let response = self.request(text).await?;

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| classifier_error(UpstreamError::Empty("No moderation results returned")))?;

        let categories: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| {
                first
                    .categories
                    .get(c.label())
                    .copied()
                    .flatten()
                    .unwrap_or(false)
            })
            .collect();

        let latency_us = start.elapsed().as_micros() as u64;
        debug!(
            flagged = first.flagged,
            categories = categories.len(),
            latency_us,
            "classification complete"
        );

        Ok(Classification {
            flagged: first.flagged,
            categories,
            latency_us,
        })
    }

    fn name(&self) -> &str {
        "openai-moderation"
    }
}

fn classifier_error(err: UpstreamError) -> ModerationError {
    ModerationError::Classifier(err)
}

// =============================================================================
// Wire structures
// =============================================================================

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ModerationResultEntry {
    flagged: bool,
    // Unknown labels are ignored; nulls count as not flagged
    #[serde(default)]
    categories: HashMap<String, Option<bool>>,
}
