//! Owner overrides of moderation decisions

use chrono::Utc;
use commentguard_core::{Comment, CommentStatus, Error, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::Store;

/// Body of a manual moderation request
#[derive(Debug, Clone, Deserialize)]
pub struct ManualModeration {
    pub status: CommentStatus,
}

/// Approve or reject a comment by hand. The comment is exempt from later
/// reruns.
pub async fn moderate_manually(
    store: &dyn Store,
    website_id: Uuid,
    comment_id: Uuid,
    status: CommentStatus,
) -> Result<Comment> {
    if status == CommentStatus::Pending {
        return Err(Error::invalid("status must be 'approved' or 'rejected'"));
    }

    let mut comment = store
        .comment(comment_id)
        .await?
        .ok_or_else(|| Error::not_found("comment", comment_id))?;

    let page = store
        .page(comment.page_id)
        .await?
        .ok_or_else(|| Error::not_found("page", comment.page_id))?;
    if page.website_id != website_id {
        return Err(Error::not_found("comment", comment_id));
    }

    comment.moderate_manually(status, Utc::now())?;
    store.save_comment(&comment).await?;
    Ok(comment)
}
