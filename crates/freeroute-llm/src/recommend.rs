//! Recommendation generation
//!
//! Pure function of the current active pool and score memory; recomputed
//! in full after every prune cycle, at most one entry per kind.

use serde::{Deserialize, Serialize};

use crate::memory::{ModelMemory, ScoreEntry};
use crate::types::ActiveModel;

/// The six recommendation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    General,
    Speed,
    Rag,
    Code,
    Vision,
    Moe,
}

/// A per-slot model recommendation with a human-readable reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub model: String,
    pub reason: String,
    pub score: u64,
}

/// Recompute the full recommendation list from the pool
///
/// `general` picks the best average score among chat-capable models,
/// `speed` the lowest last-probe latency, and the category slots pick the
/// first pool model carrying the category. An untested model scores 0.
pub fn generate(pool: &[ActiveModel], memory: &ModelMemory) -> Vec<Recommendation> {
    let avg_score = |id: &str| memory.scores.get(id).map_or(0, ScoreEntry::avg_score);
    let mut recommendations = Vec::new();

    let best_general = pool
        .iter()
        .filter(|m| has_category(m, "Chat"))
        .max_by_key(|m| avg_score(&m.id));
    if let Some(model) = best_general {
        recommendations.push(Recommendation {
            kind: RecommendationKind::General,
            model: model.id.clone(),
            reason: "Best overall chat score".to_owned(),
            score: avg_score(&model.id),
        });
    }

    let fastest = pool
        .iter()
        .filter_map(|m| m.last_test.map(|t| (m, t.latency_ms)))
        .min_by_key(|(_, latency)| *latency);
    if let Some((model, latency)) = fastest {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Speed,
            model: model.id.clone(),
            reason: format!("Fastest response ({latency}ms)"),
            score: avg_score(&model.id),
        });
    }

    let category_slots = [
        (RecommendationKind::Rag, "RAG", "Suited for document and retrieval queries"),
        (RecommendationKind::Code, "Code", "Best for programming"),
        (RecommendationKind::Vision, "Vision", "Supports image analysis"),
        (RecommendationKind::Moe, "MoE", "Mixture of Experts architecture"),
    ];
    for (kind, category, reason) in category_slots {
        if let Some(model) = pool.iter().find(|m| has_category(m, category)) {
            recommendations.push(Recommendation {
                kind,
                model: model.id.clone(),
                reason: reason.to_owned(),
                score: avg_score(&model.id),
            });
        }
    }

    recommendations
}

fn has_category(model: &ActiveModel, category: &str) -> bool {
    model.categories.iter().any(|c| c == category)
}
