//! Wire and domain types for the model pool and chat surface

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message in OpenAI wire format
///
/// Content is kept as raw JSON so structured content (e.g. multimodal
/// parts) passes through to the upstream untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Value,
}

impl Message {
    /// Build a system message from plain text
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_owned(),
            content: Value::String(content.to_owned()),
        }
    }

    /// Build a user message from plain text
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_owned(),
            content: Value::String(content.to_owned()),
        }
    }

    /// Content as display text (structured content is serialized)
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Inbound chat request: OpenAI-style `messages` or a flat `prompt`
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub params: ChatParams,
}

/// Allow-listed optional parameters forwarded verbatim to the upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Value>,
}

/// Body sent to the upstream chat-completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatBody {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub params: ChatParams,
}

/// One catalog entry as returned by the upstream models endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawModel {
    pub id: String,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
}

/// Pricing block of a catalog entry; only used for the free check
#[derive(Debug, Clone, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub prompt: Option<Value>,
}

/// Wrapper around the upstream catalog listing
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub data: Vec<RawModel>,
}

/// A model currently considered usable for live chat routing
#[derive(Debug, Clone, Serialize)]
pub struct ActiveModel {
    pub id: String,
    pub context_length: u64,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_test: Option<LastTest>,
}

/// Result of the most recent probe, annotated with running averages
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LastTest {
    pub success: bool,
    pub latency_ms: u64,
    pub quality_score: u8,
    pub avg_score: u64,
    pub avg_latency: u64,
}

/// One entry of the bounded request history (newest first)
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub time: String,
    pub model: String,
    pub prompt: String,
    pub status: String,
}

/// OpenAI-style model listing entry for `GET /v1/models`
#[derive(Debug, Serialize)]
pub struct ModelListing {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub owned_by: String,
    pub context_length: u64,
}

impl ModelListing {
    /// Build a listing entry; `owned_by` is the vendor prefix of the id
    pub fn from_active(model: &ActiveModel, created: u64) -> Self {
        let owned_by = model
            .id
            .split_once('/')
            .map_or("openrouter", |(vendor, _)| vendor)
            .to_owned();

        Self {
            id: model.id.clone(),
            object: "model".to_owned(),
            created,
            owned_by,
            context_length: model.context_length,
        }
    }
}
