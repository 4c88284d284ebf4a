//! Shared application state
//!
//! One `Arc`'d inner struct cloned into every handler and background task.
//! The active pool is only ever replaced wholesale or shrunk by id, so
//! readers never observe a partially rebuilt list.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::Zoned;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use freeroute_config::{
    DEFAULT_REFRESH_INTERVAL_MINUTES, HISTORY_MAX, PersistedConfig, ProxyConfig,
};

use crate::client::UpstreamClient;
use crate::recommend::Recommendation;
use crate::types::{ActiveModel, HistoryEntry};

/// Cloneable handle to the shared state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: ProxyConfig,
    client: UpstreamClient,
    persisted: RwLock<PersistedConfig>,
    active_models: RwLock<Vec<ActiveModel>>,
    history: RwLock<VecDeque<HistoryEntry>>,
    recommendations: RwLock<Vec<Recommendation>>,
    last_sync: RwLock<Option<String>>,
    is_syncing: AtomicBool,
    refresh_timer: std::sync::Mutex<Option<CancellationToken>>,
}

impl AppState {
    /// Build the state, loading the persisted records from disk
    pub fn new(config: ProxyConfig) -> Self {
        let persisted = PersistedConfig::load(&config.config_path);
        let client = UpstreamClient::new(config.base_url.clone(), config.env_api_key.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                client,
                persisted: RwLock::new(persisted),
                active_models: RwLock::new(Vec::new()),
                history: RwLock::new(VecDeque::new()),
                recommendations: RwLock::new(Vec::new()),
                last_sync: RwLock::new(None),
                is_syncing: AtomicBool::new(false),
                refresh_timer: std::sync::Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.inner.client
    }

    /// Snapshot of the persisted settings
    pub async fn persisted(&self) -> PersistedConfig {
        self.inner.persisted.read().await.clone()
    }

    /// Mutate the persisted settings and flush them to disk
    ///
    /// The file write happens on the blocking pool, after the lock is
    /// released, so readers never wait on disk I/O.
    pub async fn update_persisted(&self, apply: impl FnOnce(&mut PersistedConfig)) {
        let snapshot = {
            let mut persisted = self.inner.persisted.write().await;
            apply(&mut persisted);
            persisted.clone()
        };
        let path = self.inner.config.config_path.clone();
        tokio::task::spawn_blocking(move || snapshot.save(&path))
            .await
            .ok();
    }

    /// API key set through the admin surface; empty = none
    pub async fn ui_api_key(&self) -> String {
        self.inner.persisted.read().await.api_key.clone()
    }

    /// Whether any credential is available for upstream calls
    pub async fn api_key_configured(&self) -> bool {
        !self.inner.persisted.read().await.api_key.is_empty()
            || self.inner.config.env_api_key.is_some()
    }

    /// Effective probe timeout: request-timeout override, else the default
    pub async fn probe_timeout(&self) -> std::time::Duration {
        let overrides = self.inner.persisted.read().await.config_overrides;
        overrides
            .request_timeout
            .map_or(self.inner.config.probe_timeout, std::time::Duration::from_secs)
    }

    /// Effective chat timeout: request-timeout override, else the default
    pub async fn chat_timeout(&self) -> std::time::Duration {
        let overrides = self.inner.persisted.read().await.config_overrides;
        overrides
            .request_timeout
            .map_or(self.inner.config.chat_timeout, std::time::Duration::from_secs)
    }

    /// Effective refresh interval between automatic catalog syncs
    pub async fn refresh_interval(&self) -> std::time::Duration {
        let overrides = self.inner.persisted.read().await.config_overrides;
        let minutes = overrides
            .refresh_interval
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MINUTES);
        std::time::Duration::from_secs(minutes * 60)
    }

    /// Snapshot of the active pool, in routing order
    pub async fn active_models(&self) -> Vec<ActiveModel> {
        self.inner.active_models.read().await.clone()
    }

    pub async fn pool_size(&self) -> usize {
        self.inner.active_models.read().await.len()
    }

    /// Replace the whole active pool
    pub async fn replace_pool(&self, models: Vec<ActiveModel>) {
        *self.inner.active_models.write().await = models;
    }

    /// Drop one model from the pool by id
    pub async fn remove_model(&self, model_id: &str) {
        self.inner
            .active_models
            .write()
            .await
            .retain(|m| m.id != model_id);
    }

    /// Record a served request: bump counters and prepend a history entry
    pub async fn record_success(&self, model_id: &str, prompt: String) {
        self.update_persisted(|p| p.usage_stats.success += 1).await;
        self.push_history(model_id, prompt, "OK").await;
    }

    /// Record a request that exhausted every candidate model
    ///
    /// Only the error counter moves; the history tracks served requests.
    pub async fn record_exhaustion(&self) {
        self.update_persisted(|p| p.usage_stats.errors += 1).await;
    }

    async fn push_history(&self, model_id: &str, prompt: String, status: &str) {
        let entry = HistoryEntry {
            time: Zoned::now().strftime("%H:%M").to_string(),
            model: model_id.to_owned(),
            prompt,
            status: status.to_owned(),
        };
        let mut history = self.inner.history.write().await;
        history.push_front(entry);
        history.truncate(HISTORY_MAX);
    }

    /// Request history, newest first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.inner.history.read().await.iter().cloned().collect()
    }

    /// Claim the single sync slot; `None` while another sync is running
    ///
    /// The returned guard releases the slot on drop.
    pub fn begin_sync(&self) -> Option<SyncGuard> {
        self.inner
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| SyncGuard {
                inner: Arc::clone(&self.inner),
            })
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.is_syncing.load(Ordering::SeqCst)
    }

    pub async fn last_sync(&self) -> Option<String> {
        self.inner.last_sync.read().await.clone()
    }

    pub async fn set_last_sync_now(&self) {
        let stamp = Zoned::now().strftime("%Y-%m-%d %H:%M:%S").to_string();
        *self.inner.last_sync.write().await = Some(stamp);
    }

    pub async fn recommendations(&self) -> Vec<Recommendation> {
        self.inner.recommendations.read().await.clone()
    }

    pub async fn set_recommendations(&self, recommendations: Vec<Recommendation>) {
        *self.inner.recommendations.write().await = recommendations;
    }

    /// Install a new refresh-timer token, returning the previous one so the
    /// caller can cancel the old loop
    pub fn swap_refresh_timer(&self, token: CancellationToken) -> Option<CancellationToken> {
        let mut slot = self
            .inner
            .refresh_timer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slot.replace(token)
    }
}

/// Holds the sync slot until dropped
pub struct SyncGuard {
    inner: Arc<Inner>,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.inner.is_syncing.store(false, Ordering::SeqCst);
    }
}
