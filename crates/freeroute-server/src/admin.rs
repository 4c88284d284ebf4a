//! Admin endpoints: health, manual refresh, configuration changes

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use freeroute_config::RoutingMode;
use freeroute_llm::AppState;
use freeroute_llm::pool;
use http::StatusCode;
use http::header::SET_COOKIE;
use serde::Deserialize;

use crate::error::{ServerError, error_response};
use crate::session;

/// Liveness and pool summary
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let persisted = state.persisted().await;
    Json(serde_json::json!({
        "status": "ok",
        "models_available": state.pool_size().await,
        "mode": persisted.mode,
        "is_syncing": state.is_syncing(),
        "last_sync": state.last_sync().await,
        "api_key_configured": state.api_key_configured().await,
    }))
}

/// Kick off a catalog refresh in the background
///
/// Answers immediately; a refresh already in flight is reported instead
/// of queued.
pub async fn refresh(State(state): State<AppState>) -> Response {
    if state.is_syncing() {
        let body = serde_json::json!({ "status": "sync already in progress" });
        return (StatusCode::ACCEPTED, Json(body)).into_response();
    }

    tracing::info!("manual refresh requested");
    tokio::spawn(async move {
        pool::full_refresh(&state).await;
    });
    Json(serde_json::json!({ "status": "refresh started" })).into_response()
}

/// One configuration mutation, discriminated by `action`
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConfigAction {
    SystemPrompt {
        #[serde(default)]
        system_prompt: String,
    },
    Mode {
        mode: RoutingMode,
        #[serde(default)]
        model_id: Option<String>,
    },
    AdvancedSettings {
        #[serde(default)]
        refresh_interval: Option<u64>,
        #[serde(default)]
        request_timeout: Option<u64>,
    },
    ApiKey {
        #[serde(default)]
        api_key: String,
    },
    DashboardPassword {
        #[serde(default)]
        new_password: String,
        #[serde(default)]
        current_password: Option<String>,
    },
}

/// Apply one configuration change and persist it
pub async fn update_config(
    State(state): State<AppState>,
    Json(action): Json<ConfigAction>,
) -> Response {
    match action {
        ConfigAction::SystemPrompt { system_prompt } => {
            state
                .update_persisted(|p| p.system_prompt = system_prompt)
                .await;
        }
        ConfigAction::Mode { mode, model_id } => {
            tracing::info!(?mode, model = model_id.as_deref(), "routing mode changed");
            state
                .update_persisted(|p| {
                    p.mode = mode;
                    // A mode switch always rewrites the fixed model; auto
                    // never keeps one around
                    p.fixed_model = if mode == RoutingMode::Manual {
                        model_id
                    } else {
                        None
                    };
                })
                .await;
        }
        ConfigAction::AdvancedSettings {
            refresh_interval,
            request_timeout,
        } => {
            state
                .update_persisted(|p| {
                    if refresh_interval.is_some() {
                        p.config_overrides.refresh_interval = refresh_interval;
                    }
                    if request_timeout.is_some() {
                        p.config_overrides.request_timeout = request_timeout;
                    }
                })
                .await;
            // A new interval takes effect immediately, not at the next tick
            if refresh_interval.is_some() {
                pool::restart_auto_refresh(&state).await;
            }
        }
        ConfigAction::ApiKey { api_key } => {
            tracing::info!("api key updated through admin surface");
            state.update_persisted(|p| p.api_key = api_key).await;
        }
        ConfigAction::DashboardPassword {
            new_password,
            current_password,
        } => {
            let existing = state.persisted().await.dashboard_password;
            if !existing.is_empty() && current_password.as_deref() != Some(existing.as_str()) {
                return error_response(&ServerError::ConfigConflict);
            }
            state
                .update_persisted(|p| p.dashboard_password = new_password)
                .await;

            // Existing sessions carry the old password, invalidate them
            let mut response = Json(serde_json::json!({ "status": "ok" })).into_response();
            response
                .headers_mut()
                .insert(SET_COOKIE, session::clear_cookie());
            return response;
        }
    }

    Json(serde_json::json!({ "status": "ok" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_actions_deserialize_by_tag() {
        let action: ConfigAction =
            serde_json::from_str(r#"{"action":"system_prompt","system_prompt":"be terse"}"#)
                .unwrap();
        assert!(matches!(
            action,
            ConfigAction::SystemPrompt { system_prompt } if system_prompt == "be terse"
        ));

        let action: ConfigAction =
            serde_json::from_str(r#"{"action":"mode","mode":"manual","model_id":"a/b"}"#).unwrap();
        assert!(matches!(
            action,
            ConfigAction::Mode { mode: RoutingMode::Manual, model_id: Some(_) }
        ));
    }

    #[test]
    fn advanced_settings_fields_are_optional() {
        let action: ConfigAction =
            serde_json::from_str(r#"{"action":"advanced_settings","refresh_interval":5}"#).unwrap();
        assert!(matches!(
            action,
            ConfigAction::AdvancedSettings {
                refresh_interval: Some(5),
                request_timeout: None,
            }
        ));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<ConfigAction>(r#"{"action":"reboot"}"#).is_err());
    }
}
