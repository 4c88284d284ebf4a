use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the chat router picks candidate models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Walk the active pool in order until one model answers
    #[default]
    Auto,
    /// Route every request to the single fixed model
    Manual,
}

/// Success/error counters accumulated across restarts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub success: u64,
    pub errors: u64,
}

/// Admin-set overrides for compile-time defaults
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Automatic refresh interval, in minutes
    pub refresh_interval: Option<u64>,
    /// Upstream request timeout, in seconds (probes and live chat)
    pub request_timeout: Option<u64>,
}

/// The configuration record persisted to disk
///
/// Whole-file JSON overwrite on every mutation meant to survive a restart.
/// The active pool, history and logs are rebuilt from the live catalog on
/// each start and are deliberately not part of this record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedConfig {
    pub mode: RoutingMode,
    pub fixed_model: Option<String>,
    pub system_prompt: String,
    pub usage_stats: UsageStats,
    pub config_overrides: ConfigOverrides,
    /// API key set through the admin surface; empty = use the environment key
    pub api_key: String,
    /// Dashboard password; empty = open access
    pub dashboard_password: String,
}

impl PersistedConfig {
    /// Load the record from disk, falling back to defaults
    ///
    /// A missing or unreadable file resets the settings rather than failing
    /// startup. Unknown fields are ignored, missing fields take defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "persisted config unreadable, resetting settings");
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read persisted config, resetting settings");
                Self::default()
            }
        }
    }

    /// Write the record to disk, best effort
    ///
    /// Persistence failures are logged and absorbed; a crash between a state
    /// mutation and its flush loses that mutation, which is acceptable for
    /// this system's durability posture.
    pub fn save(&self, path: &Path) {
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize persisted config");
                return;
            }
        };
        if let Err(e) = std::fs::write(path, serialized) {
            tracing::error!(path = %path.display(), error = %e, "failed to save persisted config");
        }
    }
}
