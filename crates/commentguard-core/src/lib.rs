//! CommentGuard Core
//!
//! Core types, traits, and utilities shared across CommentGuard components.
//!
//! This crate provides:
//! - Domain types for websites, pages, comments, and moderation policies
//! - The moderation decision and its result-string encoding
//! - Error types, including the closed set of moderation failures
//! - Provider settings passed explicitly into the moderation clients

pub mod error;
pub mod provider;
pub mod types;

pub use error::{Error, ModerationError, ModerationResult, Result, UpstreamError};
pub use provider::{provider_error_message, ProviderSettings};
pub use types::{
    ChatMessage, Comment, CommentStatus, Decision, ModerationPolicy, Page, Website,
    APPROVED_RESULT, MANUAL_MODERATION_RESULT, SYSTEM_ERROR_RESULT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ModerationError, ModerationResult, Result, UpstreamError};
    pub use crate::provider::ProviderSettings;
    pub use crate::types::{Comment, CommentStatus, Decision, ModerationPolicy, Page, Website};
}
