//! Configuration for freeroute
//!
//! Two layers: [`ProxyConfig`] holds bootstrap settings resolved once from
//! flags and environment at startup, and [`PersistedConfig`] is the small
//! JSON record that survives restarts (routing mode, counters, overrides,
//! credentials).

#![allow(clippy::must_use_candidate)]

mod persist;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub use persist::{ConfigOverrides, PersistedConfig, RoutingMode, UsageStats};

/// Default upstream API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default interval between automatic catalog refreshes
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 15;

/// Maximum number of entries kept in the request history
pub const HISTORY_MAX: usize = 50;

/// Timeout for the catalog listing call
pub const CATALOG_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Bootstrap configuration resolved from CLI flags and environment
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address the HTTP server binds to
    pub listen_address: SocketAddr,
    /// Upstream API base URL (e.g. `https://openrouter.ai/api/v1`)
    pub base_url: Url,
    /// API key from the environment; a key set through the admin surface
    /// takes priority over this one
    pub env_api_key: Option<SecretString>,
    /// Path of the persisted configuration record
    pub config_path: PathBuf,
    /// Path of the persisted model memory record
    pub memory_path: PathBuf,
    /// Default timeout for model probes
    pub probe_timeout: Duration,
    /// Default timeout for live chat attempts
    pub chat_timeout: Duration,
}

impl ProxyConfig {
    /// Build a configuration with default timeouts
    pub fn new(
        listen_address: SocketAddr,
        base_url: Url,
        env_api_key: Option<SecretString>,
        config_path: PathBuf,
        memory_path: PathBuf,
    ) -> Self {
        Self {
            listen_address,
            base_url,
            env_api_key,
            config_path,
            memory_path,
            probe_timeout: Duration::from_secs(10),
            chat_timeout: Duration::from_secs(60),
        }
    }
}
