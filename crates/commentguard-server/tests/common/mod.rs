//! Shared test doubles for the server integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use commentguard_classifiers::{Category, Classification, SafetyClassifier};
use commentguard_core::{
    Comment, CommentStatus, Decision, ModerationError, ModerationResult, UpstreamError, Website,
};
use commentguard_policy::{parse_verdict, PolicyEvaluator, PolicyVerdict};
use commentguard_server::manual::moderate_manually;
use commentguard_server::{CommentModerator, InMemoryStore, ModerationService, Store};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Flags "hate" and "kill"; fails every call when built with `failing()`
#[derive(Default)]
pub struct MockClassifier {
    pub calls: AtomicU32,
    fail: bool,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SafetyClassifier for MockClassifier {
    async fn classify(&self, text: &str) -> ModerationResult<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ModerationError::Classifier(UpstreamError::Transport(
                "connection refused".to_string(),
            )));
        }

        let lower = text.to_lowercase();
        let mut categories = Vec::new();
        if lower.contains("kill") {
            categories.push(Category::Violence);
        }
        if lower.contains("hate") {
            categories.push(Category::Hate);
        }

        if categories.is_empty() {
            Ok(Classification::clean())
        } else {
            Ok(Classification::flagged(categories))
        }
    }

    fn name(&self) -> &str {
        "mock-classifier"
    }
}

/// Rejects text mentioning "buy" as spam; errors on text containing the
/// configured failure marker
#[derive(Default)]
pub struct MockEvaluator {
    pub calls: AtomicU32,
    pub seen_policies: Mutex<Vec<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolicyEvaluator for MockEvaluator {
    async fn evaluate(&self, text: &str, policies: &[String]) -> ModerationResult<PolicyVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_policies.lock().push(policies.to_vec());

        if let Some(marker) = self.fail_on {
            if text.contains(marker) {
                return Err(ModerationError::PolicyEvaluator(UpstreamError::status(
                    500, None,
                )));
            }
        }

        if text.to_lowercase().contains("buy") {
            Ok(parse_verdict("REJECTED: spam content"))
        } else {
            Ok(parse_verdict("APPROVED"))
        }
    }

    fn name(&self) -> &str {
        "mock-evaluator"
    }
}

/// Moderator that lets the owner decide a comment while it is in flight.
///
/// Pending comments whose content contains the marker are approved by hand
/// before the automated decision (always a policy rejection) is returned.
pub struct OwnerOverride {
    store: Arc<InMemoryStore>,
    website_id: Uuid,
    marker: &'static str,
    pub overridden: AtomicU32,
}

impl OwnerOverride {
    pub fn new(store: Arc<InMemoryStore>, website_id: Uuid, marker: &'static str) -> Self {
        Self {
            store,
            website_id,
            marker,
            overridden: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl CommentModerator for OwnerOverride {
    async fn moderate(&self, text: &str, _policies: &[String]) -> ModerationResult<Decision> {
        if text.contains(self.marker) {
            let comments = self.store.website_comments(self.website_id).await.unwrap();
            for comment in comments {
                if comment.content == text && comment.status == CommentStatus::Pending {
                    moderate_manually(
                        self.store.as_ref(),
                        self.website_id,
                        comment.id,
                        CommentStatus::Approved,
                    )
                    .await
                    .unwrap();
                    self.overridden.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        Ok(Decision::policy_rejection("spam content"))
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub classifier: Arc<MockClassifier>,
    pub evaluator: Arc<MockEvaluator>,
    pub service: Arc<ModerationService>,
    pub website: Website,
}

impl Harness {
    pub async fn new(classifier: MockClassifier, evaluator: MockEvaluator) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let website = store
            .insert_website(Website::new("blog.example.com"))
            .await
            .unwrap();
        let classifier = Arc::new(classifier);
        let evaluator = Arc::new(evaluator);
        let service = Arc::new(ModerationService::new(
            classifier.clone(),
            evaluator.clone(),
        ));

        Self {
            store,
            classifier,
            evaluator,
            service,
            website,
        }
    }

    pub async fn standard() -> Self {
        Self::new(MockClassifier::new(), MockEvaluator::new()).await
    }

    /// Store a pending comment directly, bypassing moderation
    pub async fn pending_comment(&self, url: &str, content: &str) -> Comment {
        let page = self
            .store
            .find_or_create_page(self.website.id, url)
            .await
            .unwrap();
        self.store
            .insert_comment(Comment::new(page.id, None, content).unwrap())
            .await
            .unwrap()
    }

    pub async fn comment(&self, id: Uuid) -> Comment {
        self.store.comment(id).await.unwrap().unwrap()
    }
}
