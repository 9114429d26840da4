//! Application state shared across requests

use anyhow::Result;
use commentguard_telemetry::{AuditEvent, AuditTrail, ModerationMetrics};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::moderation::{build_http_client, CommentModerator, ModerationService};
use crate::rerun::RerunCoordinator;
use crate::store::{InMemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    pub store: Arc<dyn Store>,

    /// Moderation pipeline used by submissions and reruns
    pub moderator: Arc<dyn CommentModerator>,

    pub rerun: RerunCoordinator,

    /// Owner action log
    pub audit: Arc<Mutex<AuditTrail>>,

    pub metrics: ModerationMetrics,

    /// Prometheus handle for rendering; absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the provider-backed state and seed the store from configuration
    pub async fn new(config: ServerConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let http = build_http_client(&config.provider)?;
        let metrics = ModerationMetrics::new();
        let moderator = ModerationService::from_settings(http, Arc::new(config.provider.clone()))
            .with_metrics(metrics.clone());

        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let seeded = config.seed_store(store.as_ref()).await?;
        info!("Seeded {} websites from configuration", seeded.len());

        let mut state = Self::with_parts(config, store, Arc::new(moderator));
        state.metrics = metrics;
        state.metrics_handle = metrics_handle;
        Ok(state)
    }

    /// Assemble state from explicit parts
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn Store>,
        moderator: Arc<dyn CommentModerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rerun: RerunCoordinator::new(store.clone(), moderator.clone()),
            store,
            moderator,
            audit: Arc::new(Mutex::new(AuditTrail::new())),
            metrics: ModerationMetrics::new(),
            metrics_handle: None,
        }
    }

    /// Append an owner action to the audit trail
    pub fn record(&self, event: AuditEvent) {
        self.audit.lock().add_event(event);
    }
}
