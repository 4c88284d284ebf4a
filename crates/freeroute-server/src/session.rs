//! Dashboard session gate
//!
//! A single cookie guards the dashboard state view and the configuration
//! endpoint. The cookie value is the configured password itself; this wire
//! contract predates this implementation and is kept for compatibility.
//! With no password configured the gate is open.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use freeroute_llm::AppState;
use http::HeaderValue;
use http::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;

use crate::error::{ServerError, error_response};

pub const SESSION_COOKIE: &str = "dashboard_session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Only the dashboard surface goes through this; the chat API, health and
/// refresh endpoints are never gated.
pub async fn gate_middleware(state: AppState, request: Request, next: Next) -> Response {
    let password = state.persisted().await.dashboard_password;
    if password.is_empty() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, SESSION_COOKIE));

    if presented.as_deref() == Some(password.as_str()) {
        next.run(request).await
    } else {
        error_response(&ServerError::Unauthorized)
    }
}

pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    let password = state.persisted().await.dashboard_password;
    if !password.is_empty() && request.password != password {
        tracing::warn!("dashboard login rejected");
        return error_response(&ServerError::Unauthorized);
    }

    let mut response = Json(serde_json::json!({ "status": "ok" })).into_response();
    if !password.is_empty()
        && let Some(cookie) = session_cookie(&password)
    {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

pub async fn logout() -> Response {
    let mut response = Json(serde_json::json!({ "status": "ok" })).into_response();
    response.headers_mut().insert(SET_COOKIE, clear_cookie());
    response
}

/// Session cookie carrying the password; `None` if the password contains
/// bytes a header cannot carry
fn session_cookie(password: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={password}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("dashboard_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extract one value from a `Cookie` header
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}
