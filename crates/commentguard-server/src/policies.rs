//! Moderation policy management

use chrono::Utc;
use commentguard_core::{Error, ModerationPolicy, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::Store;

/// Body of a policy creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    pub prompt: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Body of a partial policy update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicy {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}

/// Active policy statements of a website, newest first
pub async fn active_policy_statements(store: &dyn Store, website_id: Uuid) -> Result<Vec<String>> {
    Ok(store
        .active_policies(website_id)
        .await?
        .into_iter()
        .map(|p| p.prompt)
        .collect())
}

pub async fn list_policies(store: &dyn Store, website_id: Uuid) -> Result<Vec<ModerationPolicy>> {
    require_website(store, website_id).await?;
    store.policies(website_id).await
}

pub async fn create_policy(
    store: &dyn Store,
    website_id: Uuid,
    request: CreatePolicy,
) -> Result<ModerationPolicy> {
    require_website(store, website_id).await?;
    let prompt = validate_prompt(&request.prompt)?;
    store
        .insert_policy(ModerationPolicy::new(website_id, prompt, request.is_active))
        .await
}

pub async fn update_policy(
    store: &dyn Store,
    website_id: Uuid,
    policy_id: Uuid,
    request: UpdatePolicy,
) -> Result<ModerationPolicy> {
    let mut policy = website_policy(store, website_id, policy_id).await?;

    if let Some(prompt) = &request.prompt {
        policy.prompt = validate_prompt(prompt)?.to_string();
    }
    if let Some(active) = request.is_active {
        policy.is_active = active;
    }
    policy.updated_at = Utc::now();

    store.save_policy(&policy).await?;
    Ok(policy)
}

pub async fn delete_policy(store: &dyn Store, website_id: Uuid, policy_id: Uuid) -> Result<()> {
    website_policy(store, website_id, policy_id).await?;
    if store.delete_policy(policy_id).await? {
        Ok(())
    } else {
        Err(Error::not_found("moderation prompt", policy_id))
    }
}

/// Look up a policy, treating one owned by another website as missing
async fn website_policy(
    store: &dyn Store,
    website_id: Uuid,
    policy_id: Uuid,
) -> Result<ModerationPolicy> {
    require_website(store, website_id).await?;
    store
        .policy(policy_id)
        .await?
        .filter(|p| p.website_id == website_id)
        .ok_or_else(|| Error::not_found("moderation prompt", policy_id))
}

pub(crate) async fn require_website(store: &dyn Store, website_id: Uuid) -> Result<()> {
    store
        .website(website_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::not_found("website", website_id))
}

fn validate_prompt(prompt: &str) -> Result<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        Err(Error::invalid("moderation prompt must not be empty"))
    } else {
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use commentguard_core::Website;

    async fn setup() -> (InMemoryStore, Uuid) {
        let store = InMemoryStore::new();
        let website = store.insert_website(Website::new("example.com")).await.unwrap();
        (store, website.id)
    }

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let (store, website_id) = setup().await;
        let request: CreatePolicy = serde_json::from_str(r#"{"prompt": "No spam"}"#).unwrap();

        let policy = create_policy(&store, website_id, request).await.unwrap();

        assert!(policy.is_active);
        assert_eq!(
            active_policy_statements(&store, website_id).await.unwrap(),
            vec!["No spam"]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let (store, website_id) = setup().await;
        let request = CreatePolicy {
            prompt: "  ".to_string(),
            is_active: true,
        };
        assert!(matches!(
            create_policy(&store, website_id, request).await,
            Err(Error::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (store, website_id) = setup().await;
        let policy = create_policy(
            &store,
            website_id,
            CreatePolicy {
                prompt: "No spam".to_string(),
                is_active: true,
            },
        )
        .await
        .unwrap();

        let updated = update_policy(
            &store,
            website_id,
            policy.id,
            UpdatePolicy {
                prompt: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.prompt, "No spam");
        assert!(!updated.is_active);
        assert!(updated.updated_at >= policy.updated_at);
        assert!(active_policy_statements(&store, website_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_other_website_policy_is_not_found() {
        let (store, website_id) = setup().await;
        let other = store.insert_website(Website::new("other.com")).await.unwrap();
        let policy = store
            .insert_policy(ModerationPolicy::new(other.id, "Be kind", true))
            .await
            .unwrap();

        assert!(matches!(
            update_policy(&store, website_id, policy.id, UpdatePolicy::default()).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            delete_policy(&store, website_id, policy.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(store.policy(policy.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_website() {
        let store = InMemoryStore::new();
        assert!(matches!(
            list_policies(&store, Uuid::new_v4()).await,
            Err(Error::NotFound { .. })
        ));
    }
}
