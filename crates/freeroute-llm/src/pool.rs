//! Catalog refresh and pool pruning
//!
//! The pool lifecycle: fetch the free-tier slice of the upstream catalog,
//! install it wholesale, then probe every member concurrently and keep only
//! the models that answered. At most one prune runs at a time; a refresh
//! requested while one is in flight is skipped.

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::classify::classify;
use crate::memory::ModelMemory;
use crate::probe::probe;
use crate::recommend;
use crate::state::AppState;
use crate::types::{ActiveModel, LastTest, RawModel};

/// Fetch the upstream catalog and keep the free-tier entries
///
/// Returns an empty list on upstream failure so callers keep serving the
/// previous pool instead of tearing it down.
pub async fn fetch_free_models(state: &AppState) -> Vec<ActiveModel> {
    let ui_key = state.ui_api_key().await;
    let catalog = match state.client().list_catalog(&ui_key).await {
        Ok(models) => models,
        Err(e) => {
            tracing::error!(error = %e, "catalog fetch failed, keeping current pool");
            return Vec::new();
        }
    };

    let mut pool: Vec<ActiveModel> = catalog
        .iter()
        .filter(|m| is_free(m))
        .map(|m| {
            let context_length = m.context_length.unwrap_or(0);
            let classification = classify(&m.id, context_length);
            ActiveModel {
                id: m.id.clone(),
                context_length,
                categories: classification.categories,
                tags: classification.tags,
                last_test: None,
            }
        })
        .collect();

    // Largest context first; sort is stable so catalog order breaks ties
    pool.sort_by(|a, b| b.context_length.cmp(&a.context_length));
    tracing::info!(total = catalog.len(), free = pool.len(), "catalog fetched");
    pool
}

/// A catalog entry is free when its id carries the free-tier marker or its
/// prompt price is exactly zero; absent pricing counts as free
#[allow(clippy::float_cmp)]
fn is_free(model: &RawModel) -> bool {
    if model.id.contains(":free") {
        return true;
    }
    let Some(pricing) = &model.pricing else {
        return true;
    };
    match &pricing.prompt {
        None => true,
        Some(serde_json::Value::String(s)) => s.parse::<f64>().is_ok_and(|p| p == 0.0),
        Some(serde_json::Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Probe every pooled model concurrently and drop the ones that fail
///
/// Every probe outcome, pass or fail, is folded into the durable score
/// memory. Skipped entirely when another sync already holds the slot.
pub async fn prune_dead_models(state: &AppState) {
    let Some(_guard) = state.begin_sync() else {
        tracing::warn!("scan already in progress, skipping prune");
        return;
    };

    let snapshot = state.active_models().await;
    if snapshot.is_empty() {
        state.set_last_sync_now().await;
        return;
    }

    let ui_key = state.ui_api_key().await;
    let timeout = state.probe_timeout().await;
    tracing::info!(models = snapshot.len(), "probing pool");

    let probes = snapshot
        .iter()
        .map(|m| probe(state.client(), &ui_key, &m.id, timeout));
    let results = join_all(probes).await;

    let memory_path = state.config().memory_path.clone();
    let mut memory = {
        let path = memory_path.clone();
        tokio::task::spawn_blocking(move || ModelMemory::load(&path))
            .await
            .unwrap_or_default()
    };
    let mut survivors = Vec::with_capacity(snapshot.len());

    for (model, result) in snapshot.into_iter().zip(results) {
        let entry = memory.scores.entry(model.id.clone()).or_default();
        entry.record(result.quality_score, result.latency);

        if result.success {
            let last_test = LastTest {
                success: true,
                latency_ms: u64::try_from(result.latency.as_millis()).unwrap_or(u64::MAX),
                quality_score: result.quality_score,
                avg_score: entry.avg_score(),
                avg_latency: entry.avg_latency(),
            };
            memory.classifications.insert(
                model.id.clone(),
                crate::classify::Classification {
                    categories: model.categories.clone(),
                    tags: model.tags.clone(),
                },
            );
            survivors.push(ActiveModel {
                last_test: Some(last_test),
                ..model
            });
        } else {
            tracing::warn!(
                model = %model.id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "model failed probe, removing from pool"
            );
        }
    }

    let recommendations = recommend::generate(&survivors, &memory);
    if !recommendations.is_empty() {
        memory.recommendations.clone_from(&recommendations);
        state.set_recommendations(recommendations).await;
    }

    let remaining = survivors.len();
    state.replace_pool(survivors).await;
    tokio::task::spawn_blocking(move || memory.save(&memory_path))
        .await
        .ok();
    state.set_last_sync_now().await;
    tracing::info!(remaining, "prune finished");
}

/// Refresh the catalog and kick off a prune in the background
///
/// The fresh list is only installed when non-empty so an upstream outage
/// never empties a working pool.
pub async fn full_refresh(state: &AppState) {
    let fresh = fetch_free_models(state).await;
    if !fresh.is_empty() {
        state.replace_pool(fresh).await;
    }
    let state = state.clone();
    tokio::spawn(async move {
        prune_dead_models(&state).await;
    });
}

/// Startup sequence: initial fetch, background prune, refresh timer
pub async fn start_auto_refresh(state: &AppState) {
    let fresh = fetch_free_models(state).await;
    if !fresh.is_empty() {
        state.replace_pool(fresh).await;
    }
    {
        let state = state.clone();
        tokio::spawn(async move {
            prune_dead_models(&state).await;
        });
    }
    restart_auto_refresh(state).await;
}

/// (Re)arm the periodic refresh timer, cancelling any previous loop
///
/// Called again whenever the admin surface changes the interval.
pub async fn restart_auto_refresh(state: &AppState) {
    let interval = state.refresh_interval().await;
    let token = CancellationToken::new();
    if let Some(old) = state.swap_refresh_timer(token.clone()) {
        old.cancel();
    }

    let state = state.clone();
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "refresh timer armed");
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(interval) => full_refresh(&state).await,
            }
        }
    });
}
