//! Hash-chained audit trail of owner actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Audit trail with hash-chained events for tamper detection
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Vec<AuditEvent>,
    chain_hash: Option<String>,
}

impl AuditTrail {
    /// Create a new audit trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event to the audit trail
    pub fn add_event(&mut self, event: AuditEvent) {
        let mut event = event;
        event.previous_hash = self.chain_hash.clone();

        let hash = compute_hash(&event);
        event.hash = Some(hash.clone());

        self.chain_hash = Some(hash);
        self.events.push(event);
    }

    /// Verify the integrity of the audit trail
    pub fn verify(&self) -> bool {
        let mut prev_hash: Option<String> = None;

        for event in &self.events {
            if event.previous_hash != prev_hash {
                return false;
            }

            if event.hash.as_deref() != Some(compute_hash(event).as_str()) {
                return false;
            }

            prev_hash = event.hash.clone();
        }

        true
    }

    /// Get all events
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Hash everything except the hash field itself.
///
/// Every field is length-prefixed so adjacent fields cannot trade bytes.
fn compute_hash(event: &AuditEvent) -> String {
    let mut hasher = Sha256::new();

    update_field(&mut hasher, event.action.as_str().as_bytes());
    update_field(&mut hasher, event.entity_type.as_bytes());
    update_optional(&mut hasher, event.entity_id.as_deref());
    hasher.update((event.metadata.len() as u64).to_le_bytes());
    for (key, value) in &event.metadata {
        update_field(&mut hasher, key.as_bytes());
        update_field(&mut hasher, value.as_bytes());
    }
    update_field(&mut hasher, event.timestamp.to_rfc3339().as_bytes());
    update_optional(&mut hasher, event.previous_hash.as_deref());

    format!("{:x}", hasher.finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            update_field(hasher, value.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// Kind of owner action being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "website.created")]
    WebsiteCreated,
    #[serde(rename = "policy.created")]
    PolicyCreated,
    #[serde(rename = "policy.updated")]
    PolicyUpdated,
    #[serde(rename = "policy.deleted")]
    PolicyDeleted,
    #[serde(rename = "moderation.rerun")]
    ModerationRerun,
    #[serde(rename = "comment.moderated")]
    CommentModerated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebsiteCreated => "website.created",
            Self::PolicyCreated => "policy.created",
            Self::PolicyUpdated => "policy.updated",
            Self::PolicyDeleted => "policy.deleted",
            Self::ModerationRerun => "moderation.rerun",
            Self::CommentModerated => "comment.moderated",
        }
    }
}

/// A single audit event in the trail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// What was done
    pub action: AuditAction,

    /// Kind of record touched ("website", "moderation_prompt", "comment")
    pub entity_type: String,

    /// Identifier of the record touched
    pub entity_id: Option<String>,

    /// Extra key-value context
    pub metadata: BTreeMap<String, String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Hash of this event
    pub hash: Option<String>,

    /// Hash of previous event (for chaining)
    pub previous_hash: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(action: AuditAction, entity_type: impl Into<String>) -> Self {
        Self {
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            metadata: BTreeMap::new(),
            timestamp: Utc::now(),
            hash: None,
            previous_hash: None,
        }
    }

    /// Set the entity id
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}
