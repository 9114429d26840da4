//! OpenAI chat-completion policy evaluator
//!
//! Request:
//! ```text
//! POST {base}/chat/completions
//! {"model": "gpt-4o-mini",
//!  "messages": [{"role": "system", "content": "<instruction>"},
//!               {"role": "user", "content": "<comment>"}],
//!  "temperature": 0.3, "max_tokens": 100}
//! ```
//! The first choice's message content is parsed with [`parse_verdict`].

use async_trait::async_trait;
use commentguard_core::{
    provider_error_message, ChatMessage, ModerationError, ModerationResult, ProviderSettings,
    UpstreamError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::evaluator::PolicyEvaluator;
use crate::instruction::build_instruction;
use crate::verdict::{parse_verdict, PolicyVerdict};

/// Policy evaluator backed by the provider's chat-completion endpoint
#[derive(Clone)]
pub struct OpenAiPolicyEvaluator {
    http: reqwest::Client,
    settings: Arc<ProviderSettings>,
}

impl OpenAiPolicyEvaluator {
    /// Create an evaluator sharing an HTTP connection pool
    pub fn new(http: reqwest::Client, settings: Arc<ProviderSettings>) -> Self {
        Self { http, settings }
    }

    async fn complete(&self, request: &ChatCompletionRequest<'_>) -> ModerationResult<String> {
        let api_key = self.settings.bearer()?;
        let url = self.settings.endpoint("chat/completions");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| evaluator_error(UpstreamError::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Policy evaluation API error: Status {}, Body: {}",
                status.as_u16(),
                body
            );
            return Err(evaluator_error(UpstreamError::status(
                status.as_u16(),
                provider_error_message(&body),
            )));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| evaluator_error(UpstreamError::Malformed(e.to_string())))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| evaluator_error(UpstreamError::Empty("No policy evaluation response")))
    }
}

#[async_trait]
impl PolicyEvaluator for OpenAiPolicyEvaluator {
    async fn evaluate(&self, text: &str, policies: &[String]) -> ModerationResult<PolicyVerdict> {
        if policies.is_empty() {
            debug!("no policies supplied, nothing to evaluate");
            return Ok(PolicyVerdict::approved());
        }

        let request = ChatCompletionRequest {
            model: &self.settings.policy_model,
            messages: vec![
                ChatMessage::system(build_instruction(policies)),
                ChatMessage::user(text),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let reply = self.complete(&request).await?;
        let verdict = parse_verdict(&reply);
        debug!(
            approved = verdict.approved,
            policies = policies.len(),
            "policy evaluation complete"
        );

        Ok(verdict)
    }

    fn name(&self) -> &str {
        "openai-chat-policy"
    }
}

fn evaluator_error(err: UpstreamError) -> ModerationError {
    ModerationError::PolicyEvaluator(err)
}

// =============================================================================
// Wire structures
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}
