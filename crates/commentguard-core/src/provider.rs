//! Moderation provider settings
//!
//! Passed explicitly to every client that talks to the provider; nothing in
//! the pipeline reads the environment on its own.

use serde::{Deserialize, Serialize};

use crate::error::{ModerationError, ModerationResult};

/// Connection and model settings for the moderation provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API base URL, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer credential. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model for the safety classification endpoint
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Model for the policy evaluation chat endpoint
    #[serde(default = "default_policy_model")]
    pub policy_model: String,

    /// Sampling temperature for policy evaluation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Reply budget for policy evaluation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP timeout applied to every provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// The bearer credential, or a configuration error when absent
    pub fn bearer(&self) -> ModerationResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ModerationError::config("moderation API key not configured")),
        }
    }

    /// Absolute URL of a provider endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            classifier_model: default_classifier_model(),
            policy_model: default_policy_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Error envelope the provider returns alongside non-success statuses
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Extract the provider's reported message from an error body, if any
pub fn provider_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_classifier_model() -> String {
    "omni-moderation-latest".to_string()
}

fn default_policy_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}
