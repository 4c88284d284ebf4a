//! Two-stage model health probe
//!
//! Stage one checks liveness with a one-token completion; stage two, run
//! only when stage one succeeds, asks a fixed arithmetic question and
//! scores the reply. The quality score never overrides the liveness
//! outcome.

use std::time::{Duration, Instant};

use crate::client::UpstreamClient;
use crate::types::{ChatBody, ChatParams, Message};

/// Question used by the quality stage
const QUALITY_QUESTION: &str = "What is 2+2? Answer with just the number.";

/// Structured outcome of a single model probe
///
/// Never partial: latency is always populated, measured from the start of
/// the liveness call regardless of outcome.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub success: bool,
    pub latency: Duration,
    pub quality_score: u8,
    pub error: Option<String>,
}

/// Run the liveness + quality test against one model
pub async fn probe(
    client: &UpstreamClient,
    ui_key: &str,
    model_id: &str,
    timeout: Duration,
) -> ProbeResult {
    let start = Instant::now();

    let liveness = ChatBody {
        model: model_id.to_owned(),
        messages: vec![Message::user("Hi")],
        params: ChatParams {
            max_tokens: Some(1),
            ..ChatParams::default()
        },
    };

    if let Err(e) = client.chat_completion(ui_key, &liveness, timeout).await {
        return ProbeResult {
            success: false,
            latency: start.elapsed(),
            quality_score: 0,
            error: Some(e.to_string()),
        };
    }
    let latency = start.elapsed();

    let quality = ChatBody {
        model: model_id.to_owned(),
        messages: vec![Message::user(QUALITY_QUESTION)],
        params: ChatParams {
            max_tokens: Some(5),
            ..ChatParams::default()
        },
    };

    let quality_score = match client.chat_completion(ui_key, &quality, timeout).await {
        Ok(response) => score_reply(&reply_text(&response)),
        Err(_) => 40,
    };

    ProbeResult {
        success: true,
        latency,
        quality_score,
        error: None,
    }
}

/// Extract the assistant reply text from an upstream completion body
fn reply_text(response: &serde_json::Value) -> String {
    response["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase()
}

/// Score a quality-stage reply
///
/// A reply containing the expected digit scores 90, any other non-empty
/// reply 70, an empty reply 50.
fn score_reply(reply: &str) -> u8 {
    if reply.contains('4') {
        90
    } else if reply.is_empty() {
        50
    } else {
        70
    }
}
