use freeroute_core::HttpError;
use http::StatusCode;
use thiserror::Error;

/// Failure of a single upstream call
///
/// The three kinds drive the removal policy; they are never surfaced
/// directly to chat API consumers.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The call exceeded its configured timeout
    #[error("upstream request timed out")]
    Timeout,

    /// Connection-level failure (refused, DNS, broken transport)
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// Upstream answered with an HTTP error status
    #[error("upstream returned {code}: {body}")]
    Status { code: u16, body: String },
}

impl UpstreamError {
    /// Whether this failure evicts the model from the active pool
    ///
    /// Timeouts, transport failures and 5xx mean the model itself is
    /// unresponsive. 401/403 are credential problems and 429 is rate
    /// limiting; neither says anything about the model, so it stays in
    /// rotation and the router moves on to the next candidate.
    pub const fn should_evict(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { code, .. } => *code >= 500,
        }
    }
}

/// Errors surfaced to chat API consumers
#[derive(Debug, Error)]
pub enum RouterError {
    /// Request carried neither a usable `messages` array nor a `prompt`
    #[error("request must include a non-empty 'messages' array or a 'prompt' string")]
    MissingMessages,

    /// The candidate list was empty before any upstream call was made
    #[error("no model available, scan may be in progress")]
    NoModelAvailable,

    /// Every candidate was attempted and none answered
    #[error("no model responded, trigger a refresh")]
    AllModelsExhausted,
}

impl HttpError for RouterError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingMessages => StatusCode::BAD_REQUEST,
            Self::NoModelAvailable | Self::AllModelsExhausted => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingMessages => "invalid_request_error",
            Self::NoModelAvailable | Self::AllModelsExhausted => "service_unavailable_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}
