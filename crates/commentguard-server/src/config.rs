//! Service configuration
//!
//! Loaded from a YAML file when present, then overridden by CLI flags and
//! their environment fallbacks.

use commentguard_core::{ModerationPolicy, ProviderSettings, Website};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::cli::Cli;
use crate::store::Store;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Moderation provider connection
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Bearer token for owner routes. Unset leaves them open.
    #[serde(default, skip_serializing)]
    pub owner_token: Option<String>,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Websites and policies created at startup
    #[serde(default)]
    pub seed: Vec<SeedWebsite>,
}

/// A website declared in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedWebsite {
    /// Fixed identifier, so embed snippets survive restarts
    #[serde(default)]
    pub id: Option<Uuid>,

    pub domain: String,

    #[serde(default)]
    pub policies: Vec<SeedPolicy>,
}

/// A moderation policy declared in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPolicy {
    pub prompt: String,

    #[serde(default = "default_true")]
    pub active: bool,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(url) = &cli.provider_url {
            config.provider.base_url = url.clone();
        }

        if let Some(key) = &cli.api_key {
            config.provider.api_key = Some(key.clone());
        }

        if let Some(token) = &cli.owner_token {
            config.owner_token = Some(token.clone());
        }

        // An empty token would let any "Bearer " header through
        config.owner_token = config.owner_token.filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    /// Create the configured websites and their policies
    pub async fn seed_store(&self, store: &dyn Store) -> anyhow::Result<Vec<Website>> {
        let mut websites = Vec::with_capacity(self.seed.len());

        for seed in &self.seed {
            let mut website = Website::new(&seed.domain);
            if let Some(id) = seed.id {
                website.id = id;
            }
            let website = store.insert_website(website).await?;

            for policy in &seed.policies {
                store
                    .insert_policy(ModerationPolicy::new(website.id, &policy.prompt, policy.active))
                    .await?;
            }

            info!(
                website_id = %website.id,
                domain = %website.domain,
                policies = seed.policies.len(),
                "Seeded website"
            );
            websites.push(website);
        }

        Ok(websites)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            provider: ProviderSettings::default(),
            owner_token: None,
            max_body_bytes: default_max_body_bytes(),
            seed: Vec::new(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["commentguard-server"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/nonexistent/commentguard.yaml", &cli(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.provider.classifier_model, "omni-moderation-latest");
        assert!(config.seed.is_empty());
    }

    #[test]
    fn test_file_and_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
port: 9000
provider:
  base_url: https://provider.example.com/v1
  policy_model: gpt-4o
owner_token: from-file
seed:
  - domain: blog.example.com
    policies:
      - prompt: No self-promotion
      - prompt: Stay on topic
        active: false
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = ServerConfig::load(
            &path,
            &cli(&["--port", "9100", "--api-key", "sk-test", "--owner-token", "from-cli"]),
        )
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.provider.base_url, "https://provider.example.com/v1");
        assert_eq!(config.provider.policy_model, "gpt-4o");
        assert_eq!(config.provider.temperature, 0.3);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.owner_token.as_deref(), Some("from-cli"));
        assert_eq!(config.seed[0].policies.len(), 2);
        assert!(config.seed[0].policies[0].active);
        assert!(!config.seed[0].policies[1].active);
    }

    #[test]
    fn test_blank_owner_token_is_unset() {
        let config =
            ServerConfig::load("/nonexistent/commentguard.yaml", &cli(&["--owner-token", " "]))
                .unwrap();
        assert!(config.owner_token.is_none());
    }

    #[tokio::test]
    async fn test_seed_store() {
        let id = Uuid::new_v4();
        let config = ServerConfig {
            seed: vec![SeedWebsite {
                id: Some(id),
                domain: "blog.example.com".to_string(),
                policies: vec![
                    SeedPolicy {
                        prompt: "No self-promotion".to_string(),
                        active: true,
                    },
                    SeedPolicy {
                        prompt: "Stay on topic".to_string(),
                        active: false,
                    },
                ],
            }],
            ..Default::default()
        };

        let store = InMemoryStore::new();
        let websites = config.seed_store(&store).await.unwrap();

        assert_eq!(websites[0].id, id);
        assert_eq!(store.policies(id).await.unwrap().len(), 2);
        assert_eq!(store.active_policies(id).await.unwrap().len(), 1);
    }
}
