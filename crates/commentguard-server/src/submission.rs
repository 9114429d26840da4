//! Visitor comment submission
//!
//! Stores the comment as pending, moderates it, and writes the decision. A
//! failed moderation attempt never leaves the comment visible: it is
//! rejected with the system-error sentinel.

use chrono::Utc;
use commentguard_core::{Comment, Error, Result};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::moderation::CommentModerator;
use crate::policies::active_policy_statements;
use crate::store::Store;

/// A comment as submitted from the embed widget
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitComment {
    /// Page URL or path the comment was posted on
    pub url: String,

    #[serde(default)]
    pub author_name: Option<String>,

    pub content: String,
}

/// Submit and moderate one comment. Returns the stored comment with its
/// final status.
pub async fn submit_comment(
    store: &dyn Store,
    moderator: &dyn CommentModerator,
    website_id: Uuid,
    submission: SubmitComment,
) -> Result<Comment> {
    store
        .website(website_id)
        .await?
        .ok_or_else(|| Error::not_found("website", website_id))?;

    if submission.content.trim().is_empty() {
        return Err(Error::invalid("comment content must not be empty"));
    }
    let url = submission.url.trim();
    if url.is_empty() {
        return Err(Error::invalid("page url must not be empty"));
    }

    let page = store.find_or_create_page(website_id, url).await?;
    let comment = Comment::new(page.id, submission.author_name, submission.content)?;
    let mut comment = store.insert_comment(comment).await?;

    let policies = active_policy_statements(store, website_id).await?;

    match moderator.moderate(&comment.content, &policies).await {
        Ok(decision) => comment.apply_decision(&decision, Utc::now()),
        Err(e) => {
            error!(
                comment_id = %comment.id,
                stage = e.stage(),
                error = %e,
                "Moderation failed, rejecting comment"
            );
            comment.reject_on_error(Utc::now());
        }
    }

    // An owner may have decided the comment while it was being moderated
    if !store.save_comment_if_rerun_eligible(&comment).await? {
        return store
            .comment(comment.id)
            .await?
            .ok_or_else(|| Error::not_found("comment", comment.id));
    }

    info!(
        comment_id = %comment.id,
        website_id = %website_id,
        status = %comment.status,
        "Comment moderated"
    );
    Ok(comment)
}
