use axum::Json;
use axum::response::{IntoResponse, Response};
use freeroute_core::HttpError;
use http::StatusCode;
use thiserror::Error;

/// Errors raised by the admin and session surface
#[derive(Debug, Error)]
pub enum ServerError {
    /// Password missing or wrong for a gated endpoint
    #[error("authentication required")]
    Unauthorized,

    /// Password change attempted without the correct current password
    #[error("current password is incorrect")]
    ConfigConflict,
}

impl HttpError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::ConfigConflict => StatusCode::CONFLICT,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Unauthorized => "authentication_error",
            Self::ConfigConflict => "config_conflict",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Render a domain error as an OpenAI-style JSON error body
pub fn error_response(e: &impl HttpError) -> Response {
    let body = serde_json::json!({
        "error": { "message": e.client_message(), "type": e.error_type() }
    });
    (e.status_code(), Json(body)).into_response()
}

/// JSON fallback for unknown routes
pub async fn not_found() -> Response {
    let body = serde_json::json!({
        "error": { "message": "not found", "type": "invalid_request_error" }
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
