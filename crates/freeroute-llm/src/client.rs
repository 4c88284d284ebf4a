//! HTTP client for the upstream model provider
//!
//! Issues the catalog listing and chat-completion calls. Every call carries
//! an explicit timeout and an `Authorization` header built from whichever
//! credential is configured; unauthenticated calls are allowed (the
//! upstream accepts them for free-tier models).

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::UpstreamError;
use crate::types::{CatalogResponse, ChatBody, RawModel};

use freeroute_config::CATALOG_FETCH_TIMEOUT;

/// Client for the upstream catalog and chat-completion endpoints
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    env_api_key: Option<SecretString>,
}

impl UpstreamClient {
    /// Create a client against the given API base URL
    pub fn new(base_url: Url, env_api_key: Option<SecretString>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            env_api_key,
        }
    }

    /// Resolve the effective API key: UI-set key over environment key
    fn resolve_api_key(&self, ui_key: &str) -> Option<String> {
        if !ui_key.is_empty() {
            return Some(ui_key.to_owned());
        }
        self.env_api_key.as_ref().map(|k| k.expose_secret().to_owned())
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    /// Fetch the full upstream model catalog
    pub async fn list_catalog(&self, ui_key: &str) -> Result<Vec<RawModel>, UpstreamError> {
        let mut builder = self
            .http
            .get(self.endpoint("models"))
            .timeout(CATALOG_FETCH_TIMEOUT);

        if let Some(key) = self.resolve_api_key(ui_key) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { code, body });
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Transport(format!("failed to parse catalog: {e}")))?;

        Ok(catalog.data)
    }

    /// Send one chat-completion request, bounded by `timeout`
    ///
    /// Used both for probes and for live traffic. Returns the upstream
    /// response body verbatim.
    pub async fn chat_completion(
        &self,
        ui_key: &str,
        body: &ChatBody,
        timeout: Duration,
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut builder = self
            .http
            .post(self.endpoint("chat/completions"))
            .json(body)
            .timeout(timeout);

        if let Some(key) = self.resolve_api_key(ui_key) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { code, body });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Transport(format!("failed to parse response: {e}")))
    }
}

/// Map a reqwest failure onto the upstream error taxonomy
fn map_request_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}
