//! Dashboard state view
//!
//! One JSON snapshot of everything the admin surface shows: the pool
//! sorted by average score, routing settings, counters, history and
//! recommendations.

use std::cmp::Reverse;

use axum::Json;
use axum::extract::State;
use freeroute_llm::AppState;

pub async fn state_view(State(state): State<AppState>) -> Json<serde_json::Value> {
    let persisted = state.persisted().await;

    let mut models = state.active_models().await;
    models.sort_by_key(|m| Reverse(m.last_test.map_or(0, |t| t.avg_score)));

    Json(serde_json::json!({
        "models": models,
        "mode": persisted.mode,
        "fixed_model": persisted.fixed_model,
        "system_prompt": persisted.system_prompt,
        "usage_stats": persisted.usage_stats,
        "config_overrides": persisted.config_overrides,
        "history": state.history().await,
        "recommendations": state.recommendations().await,
        "is_syncing": state.is_syncing(),
        "last_sync": state.last_sync().await,
        "api_key_configured": state.api_key_configured().await,
    }))
}
