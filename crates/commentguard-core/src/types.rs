//! Core types for CommentGuard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Result text written when both stages let a comment through
pub const APPROVED_RESULT: &str = "Approved";

/// Result text written by an owner's manual decision
pub const MANUAL_MODERATION_RESULT: &str = "Manually moderated by owner";

/// Result text written when the submission path could not reach a decision
pub const SYSTEM_ERROR_RESULT: &str = "Moderation system error";

/// Prefix of results produced by a classifier veto
pub const CLASSIFIER_REJECTION_PREFIX: &str = "Rejected by OpenAI moderation: ";

/// Prefix of results produced by a policy rejection
pub const POLICY_REJECTION_PREFIX: &str = "Rejected by custom moderation: ";

/// Visibility state of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Not yet decided
    Pending,
    /// Publicly visible
    Approved,
    /// Hidden
    Rejected,
}

impl CommentStatus {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::invalid(format!("unknown comment status '{}'", other))),
        }
    }
}

/// A site that embeds the comment widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: Uuid,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

impl Website {
    /// Create a new website for the given domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.into(),
            created_at: Utc::now(),
        }
    }
}

/// A page of a website, identified by its URL or path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub website_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// Create a new page under a website
    pub fn new(website_id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            website_id,
            url: url.into(),
            created_at: Utc::now(),
        }
    }
}

/// A visitor-submitted comment subject to moderation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub page_id: Uuid,
    pub author_name: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub moderation_result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub moderated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manually_moderated: bool,
}

impl Comment {
    /// Create a pending comment. Content must be non-empty.
    pub fn new(
        page_id: Uuid,
        author_name: Option<String>,
        content: impl Into<String>,
    ) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::invalid("comment content must not be empty"));
        }

        // Blank author names are stored as anonymous
        let author_name = author_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            page_id,
            author_name,
            content,
            status: CommentStatus::Pending,
            moderation_result: None,
            created_at: Utc::now(),
            moderated_at: None,
            manually_moderated: false,
        })
    }

    /// Write an automated decision. `manually_moderated` is left untouched.
    pub fn apply_decision(&mut self, decision: &Decision, at: DateTime<Utc>) {
        self.status = decision.status();
        self.moderation_result = Some(decision.result.clone());
        self.moderated_at = Some(at);
    }

    /// Fail closed after a moderation attempt that produced no decision
    pub fn reject_on_error(&mut self, at: DateTime<Utc>) {
        self.status = CommentStatus::Rejected;
        self.moderation_result = Some(SYSTEM_ERROR_RESULT.to_string());
        self.moderated_at = Some(at);
    }

    /// Apply an owner's decision, exempting the comment from future reruns
    pub fn moderate_manually(&mut self, status: CommentStatus, at: DateTime<Utc>) -> Result<()> {
        if status == CommentStatus::Pending {
            return Err(Error::invalid(
                "manual moderation must approve or reject a comment",
            ));
        }

        self.status = status;
        self.manually_moderated = true;
        self.moderation_result = Some(MANUAL_MODERATION_RESULT.to_string());
        self.moderated_at = Some(at);
        Ok(())
    }

    /// Whether a backlog rerun may touch this comment
    pub fn is_rerun_eligible(&self) -> bool {
        self.status == CommentStatus::Pending && !self.manually_moderated
    }
}

/// An operator-authored moderation rule (a "prompt") for one website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationPolicy {
    pub id: Uuid,
    pub website_id: Uuid,
    pub prompt: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModerationPolicy {
    /// Create a new policy statement
    pub fn new(website_id: Uuid, prompt: impl Into<String>, is_active: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            website_id,
            prompt: prompt.into(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Final verdict for one comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the comment becomes visible
    pub approved: bool,

    /// Human-readable explanation stored as the moderation result
    pub result: String,
}

impl Decision {
    /// Both stages passed
    pub fn approve() -> Self {
        Self {
            approved: true,
            result: APPROVED_RESULT.to_string(),
        }
    }

    /// Safety classifier veto, listing the flagged category labels
    pub fn classifier_rejection<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            approved: false,
            result: format!("{}{}", CLASSIFIER_REJECTION_PREFIX, labels.join(", ")),
        }
    }

    /// Operator policy rejection
    pub fn policy_rejection(reason: &str) -> Self {
        Self {
            approved: false,
            result: format!("{}{}", POLICY_REJECTION_PREFIX, reason),
        }
    }

    /// Status this decision maps to
    pub fn status(&self) -> CommentStatus {
        if self.approved {
            CommentStatus::Approved
        } else {
            CommentStatus::Rejected
        }
    }
}

/// A chat message sent to the completion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}
