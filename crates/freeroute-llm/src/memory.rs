//! Durable per-model score memory
//!
//! Accumulates probe outcomes across runs so averages outlive pool
//! pruning; persisted as one JSON record next to the configuration file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::recommend::Recommendation;

/// Running probe aggregate for one model
///
/// Invariant: `tests >= 1` for any entry that exists; averages are always
/// `total / tests`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreEntry {
    pub tests: u64,
    pub total_score: u64,
    pub total_latency: u64,
}

impl ScoreEntry {
    /// Fold one probe outcome into the aggregate
    pub fn record(&mut self, quality_score: u8, latency: std::time::Duration) {
        self.tests += 1;
        self.total_score += u64::from(quality_score);
        self.total_latency += u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    }

    /// Average quality score, rounded to the nearest integer
    pub const fn avg_score(&self) -> u64 {
        if self.tests == 0 {
            0
        } else {
            (self.total_score + self.tests / 2) / self.tests
        }
    }

    /// Average latency in milliseconds, rounded to the nearest integer
    pub const fn avg_latency(&self) -> u64 {
        if self.tests == 0 {
            0
        } else {
            (self.total_latency + self.tests / 2) / self.tests
        }
    }
}

/// Model memory persisted independently of the active pool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMemory {
    pub scores: HashMap<String, ScoreEntry>,
    pub classifications: HashMap<String, Classification>,
    pub recommendations: Vec<Recommendation>,
}

impl ModelMemory {
    /// Load the memory record, falling back to an empty one
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "model memory unreadable, starting fresh");
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read model memory, starting fresh");
                Self::default()
            }
        }
    }

    /// Write the memory record, best effort
    pub fn save(&self, path: &Path) {
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize model memory");
                return;
            }
        };
        if let Err(e) = std::fs::write(path, serialized) {
            tracing::error!(path = %path.display(), error = %e, "failed to save model memory");
        }
    }
}
