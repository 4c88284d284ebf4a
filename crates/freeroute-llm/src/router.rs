//! Chat routing over the active pool
//!
//! Candidates are attempted strictly in pool order, one at a time. A
//! failed attempt may evict the model before moving on; the first success
//! wins and its upstream body is returned verbatim.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use freeroute_core::HttpError;
use freeroute_config::RoutingMode;

use crate::error::RouterError;
use crate::state::AppState;
use crate::types::{ActiveModel, ChatBody, ChatRequest, Message, ModelListing};

/// Routes for the chat surface: `/chat`, `/v1/chat/completions`,
/// `/v1/models`
pub fn llm_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/v1/chat/completions", post(chat))
        .route("/v1/models", get(list_models))
        .with_state(state)
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let mut messages = match normalize_messages(request.messages, request.prompt) {
        Ok(messages) => messages,
        Err(e) => return error_response(&e),
    };

    let persisted = state.persisted().await;
    if !persisted.system_prompt.trim().is_empty() {
        messages.insert(0, Message::system(&persisted.system_prompt));
    }

    let pool = state.active_models().await;
    let candidates = candidate_models(persisted.mode, persisted.fixed_model.as_deref(), &pool);
    if candidates.is_empty() {
        return error_response(&RouterError::NoModelAvailable);
    }

    let prompt = truncated_last_prompt(&messages);
    let ui_key = state.ui_api_key().await;
    let timeout = state.chat_timeout().await;

    for model_id in candidates {
        let body = ChatBody {
            model: model_id.clone(),
            messages: messages.clone(),
            params: request.params.clone(),
        };

        match state.client().chat_completion(&ui_key, &body, timeout).await {
            Ok(response) => {
                tracing::info!(model = %model_id, "chat request served");
                state.record_success(&model_id, prompt.clone()).await;
                return Json(response).into_response();
            }
            Err(e) if e.should_evict() => {
                tracing::warn!(model = %model_id, error = %e, "model unresponsive, evicting and trying next");
                state.remove_model(&model_id).await;
            }
            Err(e) => {
                tracing::warn!(model = %model_id, error = %e, "model failed, kept in pool, trying next");
            }
        }
    }

    state.record_exhaustion().await;
    error_response(&RouterError::AllModelsExhausted)
}

/// OpenAI-compatible listing of the active pool
async fn list_models(State(state): State<AppState>) -> Json<serde_json::Value> {
    let created = u64::try_from(jiff::Timestamp::now().as_second()).unwrap_or(0);
    let data: Vec<ModelListing> = state
        .active_models()
        .await
        .iter()
        .map(|m| ModelListing::from_active(m, created))
        .collect();

    Json(serde_json::json!({ "object": "list", "data": data }))
}

/// Resolve the request body into a message list
///
/// An explicitly present but empty `messages` array is rejected even when
/// a `prompt` is also supplied.
fn normalize_messages(
    messages: Option<Vec<Message>>,
    prompt: Option<String>,
) -> Result<Vec<Message>, RouterError> {
    match messages {
        Some(messages) if !messages.is_empty() => Ok(messages),
        Some(_) => Err(RouterError::MissingMessages),
        None => match prompt {
            Some(prompt) if !prompt.is_empty() => Ok(vec![Message::user(&prompt)]),
            _ => Err(RouterError::MissingMessages),
        },
    }
}

/// Candidate ids in attempt order for the current routing mode
fn candidate_models(
    mode: RoutingMode,
    fixed_model: Option<&str>,
    pool: &[ActiveModel],
) -> Vec<String> {
    match (mode, fixed_model) {
        (RoutingMode::Manual, Some(fixed)) if !fixed.is_empty() => vec![fixed.to_owned()],
        _ => pool.iter().map(|m| m.id.clone()).collect(),
    }
}

/// First 40 characters of the last message, for the request history
fn truncated_last_prompt(messages: &[Message]) -> String {
    messages
        .last()
        .map(|m| m.content_text().chars().take(40).collect())
        .unwrap_or_default()
}

/// OpenAI-style error body
fn error_response(e: &impl HttpError) -> Response {
    let body = serde_json::json!({
        "error": { "message": e.client_message(), "type": e.error_type() }
    });
    (e.status_code(), Json(body)).into_response()
}
