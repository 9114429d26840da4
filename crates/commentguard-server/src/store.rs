//! Storage for websites, pages, comments, and moderation policies
//!
//! The pipeline only relies on atomic single-row writes. [`InMemoryStore`]
//! keeps everything behind one lock, which gives that for free.

use async_trait::async_trait;
use commentguard_core::{
    Comment, CommentStatus, Error, ModerationPolicy, Page, Result, Website,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Persistence operations used by the moderation service
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_website(&self, website: Website) -> Result<Website>;
    async fn website(&self, id: Uuid) -> Result<Option<Website>>;
    /// All websites, oldest first
    async fn websites(&self) -> Result<Vec<Website>>;

    async fn page(&self, id: Uuid) -> Result<Option<Page>>;
    async fn find_page(&self, website_id: Uuid, url: &str) -> Result<Option<Page>>;
    /// Find the page with this URL under the website, creating it if needed
    async fn find_or_create_page(&self, website_id: Uuid, url: &str) -> Result<Page>;

    async fn insert_comment(&self, comment: Comment) -> Result<Comment>;
    async fn comment(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Overwrite a stored comment. Last write wins.
    async fn save_comment(&self, comment: &Comment) -> Result<()>;
    /// Overwrite a stored comment only while the stored row is still pending
    /// and not manually moderated. Returns whether the write happened.
    async fn save_comment_if_rerun_eligible(&self, comment: &Comment) -> Result<bool>;
    /// Every comment on any page of the website, newest first
    async fn website_comments(&self, website_id: Uuid) -> Result<Vec<Comment>>;
    /// Comments of one page with the given status, oldest first
    async fn page_comments(&self, page_id: Uuid, status: CommentStatus) -> Result<Vec<Comment>>;
    /// Pending, not manually moderated comments of the website, oldest first
    async fn rerun_candidates(&self, website_id: Uuid) -> Result<Vec<Comment>>;

    async fn insert_policy(&self, policy: ModerationPolicy) -> Result<ModerationPolicy>;
    async fn policy(&self, id: Uuid) -> Result<Option<ModerationPolicy>>;
    async fn save_policy(&self, policy: &ModerationPolicy) -> Result<()>;
    async fn delete_policy(&self, id: Uuid) -> Result<bool>;
    /// All policies of the website, newest first
    async fn policies(&self, website_id: Uuid) -> Result<Vec<ModerationPolicy>>;
    /// Active policies of the website, newest first
    async fn active_policies(&self, website_id: Uuid) -> Result<Vec<ModerationPolicy>>;
}

#[derive(Default)]
struct Tables {
    websites: Vec<Website>,
    pages: Vec<Page>,
    comments: Vec<Comment>,
    policies: Vec<ModerationPolicy>,
    comment_index: HashMap<Uuid, usize>,
}

impl Tables {
    fn website_page_ids(&self, website_id: Uuid) -> Vec<Uuid> {
        self.pages
            .iter()
            .filter(|p| p.website_id == website_id)
            .map(|p| p.id)
            .collect()
    }

    fn comment_mut(&mut self, id: Uuid) -> Result<&mut Comment> {
        let idx = *self
            .comment_index
            .get(&id)
            .ok_or_else(|| Error::not_found("comment", id))?;
        Ok(&mut self.comments[idx])
    }

    /// Policies of a website, newest first. Equal timestamps fall back to
    /// reverse insertion order.
    fn policies_newest_first(&self, website_id: Uuid, active_only: bool) -> Vec<ModerationPolicy> {
        let mut policies: Vec<ModerationPolicy> = self
            .policies
            .iter()
            .rev()
            .filter(|p| p.website_id == website_id && (!active_only || p.is_active))
            .cloned()
            .collect();
        policies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        policies
    }
}

/// Process-local store
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_website(&self, website: Website) -> Result<Website> {
        let mut tables = self.tables.write();
        if tables.websites.iter().any(|w| w.id == website.id) {
            return Err(Error::storage(format!("website {} already exists", website.id)));
        }
        tables.websites.push(website.clone());
        Ok(website)
    }

    async fn website(&self, id: Uuid) -> Result<Option<Website>> {
        Ok(self.tables.read().websites.iter().find(|w| w.id == id).cloned())
    }

    async fn websites(&self) -> Result<Vec<Website>> {
        Ok(self.tables.read().websites.clone())
    }

    async fn page(&self, id: Uuid) -> Result<Option<Page>> {
        Ok(self.tables.read().pages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_page(&self, website_id: Uuid, url: &str) -> Result<Option<Page>> {
        Ok(self
            .tables
            .read()
            .pages
            .iter()
            .find(|p| p.website_id == website_id && p.url == url)
            .cloned())
    }

    async fn find_or_create_page(&self, website_id: Uuid, url: &str) -> Result<Page> {
        let mut tables = self.tables.write();
        if let Some(page) = tables
            .pages
            .iter()
            .find(|p| p.website_id == website_id && p.url == url)
        {
            return Ok(page.clone());
        }

        let page = Page::new(website_id, url);
        tables.pages.push(page.clone());
        Ok(page)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        let mut tables = self.tables.write();
        if !tables.pages.iter().any(|p| p.id == comment.page_id) {
            return Err(Error::not_found("page", comment.page_id));
        }

        let idx = tables.comments.len();
        tables.comment_index.insert(comment.id, idx);
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let tables = self.tables.read();
        Ok(tables
            .comment_index
            .get(&id)
            .map(|&idx| tables.comments[idx].clone()))
    }

    async fn save_comment(&self, comment: &Comment) -> Result<()> {
        let mut tables = self.tables.write();
        *tables.comment_mut(comment.id)? = comment.clone();
        Ok(())
    }

    async fn save_comment_if_rerun_eligible(&self, comment: &Comment) -> Result<bool> {
        let mut tables = self.tables.write();
        let stored = tables.comment_mut(comment.id)?;
        if !stored.is_rerun_eligible() {
            return Ok(false);
        }
        *stored = comment.clone();
        Ok(true)
    }

    async fn website_comments(&self, website_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read();
        let page_ids = tables.website_page_ids(website_id);
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .rev()
            .filter(|c| page_ids.contains(&c.page_id))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn page_comments(&self, page_id: Uuid, status: CommentStatus) -> Result<Vec<Comment>> {
        let tables = self.tables.read();
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.page_id == page_id && c.status == status)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn rerun_candidates(&self, website_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read();
        let page_ids = tables.website_page_ids(website_id);
        Ok(tables
            .comments
            .iter()
            .filter(|c| page_ids.contains(&c.page_id) && c.is_rerun_eligible())
            .cloned()
            .collect())
    }

    async fn insert_policy(&self, policy: ModerationPolicy) -> Result<ModerationPolicy> {
        let mut tables = self.tables.write();
        if !tables.websites.iter().any(|w| w.id == policy.website_id) {
            return Err(Error::not_found("website", policy.website_id));
        }
        tables.policies.push(policy.clone());
        Ok(policy)
    }

    async fn policy(&self, id: Uuid) -> Result<Option<ModerationPolicy>> {
        Ok(self.tables.read().policies.iter().find(|p| p.id == id).cloned())
    }

    async fn save_policy(&self, policy: &ModerationPolicy) -> Result<()> {
        let mut tables = self.tables.write();
        let stored = tables
            .policies
            .iter_mut()
            .find(|p| p.id == policy.id)
            .ok_or_else(|| Error::not_found("moderation prompt", policy.id))?;
        *stored = policy.clone();
        Ok(())
    }

    async fn delete_policy(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write();
        let before = tables.policies.len();
        tables.policies.retain(|p| p.id != id);
        Ok(tables.policies.len() != before)
    }

    async fn policies(&self, website_id: Uuid) -> Result<Vec<ModerationPolicy>> {
        Ok(self.tables.read().policies_newest_first(website_id, false))
    }

    async fn active_policies(&self, website_id: Uuid) -> Result<Vec<ModerationPolicy>> {
        Ok(self.tables.read().policies_newest_first(website_id, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn store_with_site() -> (InMemoryStore, Website) {
        let store = InMemoryStore::new();
        let website = store.insert_website(Website::new("example.com")).await.unwrap();
        (store, website)
    }

    #[tokio::test]
    async fn test_find_or_create_page_is_stable() {
        let (store, website) = store_with_site().await;

        let first = store.find_or_create_page(website.id, "/post/1").await.unwrap();
        let second = store.find_or_create_page(website.id, "/post/1").await.unwrap();
        let other = store.find_or_create_page(website.id, "/post/2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_active_policies_newest_first() {
        let (store, website) = store_with_site().await;
        let now = Utc::now();

        let mut old = ModerationPolicy::new(website.id, "old rule", true);
        old.created_at = now - Duration::minutes(5);
        let mut inactive = ModerationPolicy::new(website.id, "inactive rule", false);
        inactive.created_at = now - Duration::minutes(2);
        let mut new = ModerationPolicy::new(website.id, "new rule", true);
        new.created_at = now;

        store.insert_policy(old).await.unwrap();
        store.insert_policy(new).await.unwrap();
        store.insert_policy(inactive).await.unwrap();

        let active: Vec<String> = store
            .active_policies(website.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.prompt)
            .collect();
        assert_eq!(active, vec!["new rule", "old rule"]);

        assert_eq!(store.policies(website.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_candidates_skip_decided_and_manual() {
        let (store, website) = store_with_site().await;
        let page = store.find_or_create_page(website.id, "/").await.unwrap();

        let pending = store
            .insert_comment(Comment::new(page.id, None, "pending").unwrap())
            .await
            .unwrap();

        let mut manual = Comment::new(page.id, None, "manual").unwrap();
        manual.manually_moderated = true;
        store.insert_comment(manual).await.unwrap();

        let mut decided = Comment::new(page.id, None, "decided").unwrap();
        decided.status = CommentStatus::Approved;
        store.insert_comment(decided).await.unwrap();

        let candidates = store.rerun_candidates(website.id).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, pending.id);
    }

    #[tokio::test]
    async fn test_conditional_save_respects_manual_override() {
        let (store, website) = store_with_site().await;
        let page = store.find_or_create_page(website.id, "/").await.unwrap();
        let comment = store
            .insert_comment(Comment::new(page.id, None, "hello").unwrap())
            .await
            .unwrap();

        // Owner decides while a rerun holds a stale copy
        let mut stale = comment.clone();
        let mut owner_copy = comment.clone();
        owner_copy
            .moderate_manually(CommentStatus::Approved, Utc::now())
            .unwrap();
        store.save_comment(&owner_copy).await.unwrap();

        stale.reject_on_error(Utc::now());
        let written = store.save_comment_if_rerun_eligible(&stale).await.unwrap();

        assert!(!written);
        let stored = store.comment(comment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CommentStatus::Approved);
        assert!(stored.manually_moderated);
    }

    #[tokio::test]
    async fn test_comment_requires_page() {
        let store = InMemoryStore::new();
        let orphan = Comment::new(Uuid::new_v4(), None, "hello").unwrap();
        assert!(matches!(
            store.insert_comment(orphan).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let (store, website) = store_with_site().await;
        let policy = store
            .insert_policy(ModerationPolicy::new(website.id, "rule", true))
            .await
            .unwrap();

        assert!(store.delete_policy(policy.id).await.unwrap());
        assert!(!store.delete_policy(policy.id).await.unwrap());
        assert!(store.policy(policy.id).await.unwrap().is_none());
    }
}
