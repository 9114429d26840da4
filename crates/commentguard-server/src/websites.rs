//! Website registration and comment listings

use chrono::{DateTime, Utc};
use commentguard_core::{Comment, CommentStatus, Error, Result, Website};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policies::require_website;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebsite {
    pub domain: String,
}

/// Per-status comment counts of a website
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl CommentCounts {
    fn add(&mut self, status: CommentStatus) {
        match status {
            CommentStatus::Pending => self.pending += 1,
            CommentStatus::Approved => self.approved += 1,
            CommentStatus::Rejected => self.rejected += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSummary {
    #[serde(flatten)]
    pub website: Website,
    pub comments: CommentCounts,
}

/// What visitors see of an approved comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComment {
    pub id: Uuid,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for PublicComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author_name: comment.author_name,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

pub async fn create_website(store: &dyn Store, request: CreateWebsite) -> Result<Website> {
    let domain = request.domain.trim();
    if domain.is_empty() {
        return Err(Error::invalid("domain must not be empty"));
    }
    store.insert_website(Website::new(domain)).await
}

pub async fn list_websites(store: &dyn Store) -> Result<Vec<WebsiteSummary>> {
    let mut summaries = Vec::new();
    for website in store.websites().await? {
        let mut counts = CommentCounts::default();
        for comment in store.website_comments(website.id).await? {
            counts.add(comment.status);
        }
        summaries.push(WebsiteSummary {
            website,
            comments: counts,
        });
    }
    Ok(summaries)
}

/// Owner view of every comment, newest first
pub async fn website_comments(store: &dyn Store, website_id: Uuid) -> Result<Vec<Comment>> {
    require_website(store, website_id).await?;
    store.website_comments(website_id).await
}

/// Approved comments of one page, oldest first
pub async fn public_comments(
    store: &dyn Store,
    website_id: Uuid,
    url: &str,
) -> Result<Vec<PublicComment>> {
    require_website(store, website_id).await?;
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::invalid("page url must not be empty"));
    }

    let page = store.find_or_create_page(website_id, url).await?;
    Ok(store
        .page_comments(page.id, CommentStatus::Approved)
        .await?
        .into_iter()
        .map(PublicComment::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_counts_per_status() {
        let store = InMemoryStore::new();
        let website = create_website(
            &store,
            CreateWebsite {
                domain: " blog.example.com ".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(website.domain, "blog.example.com");

        let page = store.find_or_create_page(website.id, "/a").await.unwrap();
        for status in [CommentStatus::Approved, CommentStatus::Approved, CommentStatus::Rejected] {
            let mut comment = Comment::new(page.id, None, "text").unwrap();
            comment.status = status;
            store.insert_comment(comment).await.unwrap();
        }
        store
            .insert_comment(Comment::new(page.id, None, "waiting").unwrap())
            .await
            .unwrap();

        let summaries = list_websites(&store).await.unwrap();
        assert_eq!(
            summaries[0].comments,
            CommentCounts {
                pending: 1,
                approved: 2,
                rejected: 1
            }
        );
    }

    #[tokio::test]
    async fn test_public_comments_only_approved() {
        let store = InMemoryStore::new();
        let website = store.insert_website(Website::new("example.com")).await.unwrap();
        let page = store.find_or_create_page(website.id, "/post").await.unwrap();

        let mut visible = Comment::new(page.id, Some("Ada".to_string()), "visible").unwrap();
        visible.status = CommentStatus::Approved;
        let mut hidden = Comment::new(page.id, None, "hidden").unwrap();
        hidden.status = CommentStatus::Rejected;
        store.insert_comment(visible).await.unwrap();
        store.insert_comment(hidden).await.unwrap();

        let comments = public_comments(&store, website.id, "/post").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "visible");

        let json = serde_json::to_value(&comments[0]).unwrap();
        assert!(json.get("status").is_none());
        assert!(json.get("moderationResult").is_none());
    }

    #[tokio::test]
    async fn test_empty_domain_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(
            create_website(&store, CreateWebsite { domain: "".to_string() }).await,
            Err(Error::Invalid(_))
        ));
    }
}
