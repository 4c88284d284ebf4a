//! Scriptable mock of the upstream model provider
//!
//! Serves a fixed catalog and per-model chat behaviors that tests can
//! flip at runtime. Behaviors default to answering, so a freshly started
//! proxy passes its startup probe sweep untouched.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// What the mock does when a chat request names a model
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Answer 200 with a completion containing "4"
    Ok,
    /// Stall far beyond any configured timeout, then answer
    Hang,
    /// Answer with the given HTTP status
    Status(u16),
}

pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    /// (id, context_length) catalog entries, all free tier
    catalog: Vec<(String, u64)>,
    behaviors: Mutex<HashMap<String, Behavior>>,
    chat_count: AtomicU32,
    chat_counts: Mutex<HashMap<String, u32>>,
}

impl MockUpstream {
    /// Start the mock with the given free-tier catalog
    pub async fn start(catalog: &[(&str, u64)]) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            catalog: catalog
                .iter()
                .map(|(id, ctx)| ((*id).to_owned(), *ctx))
                .collect(),
            behaviors: Mutex::new(HashMap::new()),
            chat_count: AtomicU32::new(0),
            chat_counts: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/models", routing::get(handle_models))
            .route("/chat/completions", routing::post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the upstream
    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Script the behavior for one model id
    pub fn set_behavior(&self, model: &str, behavior: Behavior) {
        self.state
            .behaviors
            .lock()
            .unwrap()
            .insert(model.to_owned(), behavior);
    }

    /// Total chat requests received, probes included
    pub fn chat_count(&self) -> u32 {
        self.state.chat_count.load(Ordering::Relaxed)
    }

    /// Chat requests received for one model id
    pub fn chat_count_for(&self, model: &str) -> u32 {
        self.state
            .chat_counts
            .lock()
            .unwrap()
            .get(model)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_models(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    let data: Vec<serde_json::Value> = state
        .catalog
        .iter()
        .map(|(id, ctx)| {
            serde_json::json!({
                "id": id,
                "context_length": ctx,
                "pricing": { "prompt": "0" },
            })
        })
        .collect();

    Json(serde_json::json!({ "data": data }))
}

async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    state.chat_count.fetch_add(1, Ordering::Relaxed);
    *state
        .chat_counts
        .lock()
        .unwrap()
        .entry(model.clone())
        .or_insert(0) += 1;

    let behavior = state
        .behaviors
        .lock()
        .unwrap()
        .get(&model)
        .copied()
        .unwrap_or(Behavior::Ok);

    match behavior {
        Behavior::Ok => {}
        Behavior::Hang => tokio::time::sleep(std::time::Duration::from_secs(10)).await,
        Behavior::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = serde_json::json!({
                "error": { "message": "mock upstream scripted failure", "type": "server_error" }
            });
            return (status, Json(body)).into_response();
        }
    }

    let response = serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "4" },
            "finish_reason": "stop",
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11 },
    });
    Json(response).into_response()
}
