//! HTTP server assembly for freeroute
//!
//! Wires the chat surface from `freeroute-llm` together with the admin,
//! health and dashboard endpoints, gates the dashboard surface behind the
//! session cookie, and owns the listener lifecycle.

mod admin;
mod dashboard;
mod error;
mod session;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use freeroute_config::ProxyConfig;
use freeroute_llm::{AppState, llm_router, pool};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server and start the pool lifecycle
    ///
    /// Performs the initial catalog fetch, spawns the first prune in the
    /// background and arms the refresh timer before returning.
    pub async fn new(config: ProxyConfig) -> Self {
        let listen_address = config.listen_address;
        let state = AppState::new(config);
        pool::start_auto_refresh(&state).await;

        // Only the dashboard surface sits behind the session gate; the
        // chat API, health, refresh and the session endpoints stay open.
        let gate_state = state.clone();
        let gated = Router::new()
            .route("/", get(dashboard::state_view))
            .route("/config", post(admin::update_config))
            .route_layer(axum::middleware::from_fn(move |req, next| {
                let state = gate_state.clone();
                async move { session::gate_middleware(state, req, next).await }
            }))
            .with_state(state.clone());

        let open = Router::new()
            .route("/health", get(admin::health))
            .route("/refresh", post(admin::refresh))
            .route("/login", post(session::login))
            .route("/logout", post(session::logout))
            .with_state(state.clone());

        let router = Router::new()
            .merge(llm_router(state))
            .merge(gated)
            .merge(open)
            .fallback(error::not_found)
            .layer(TraceLayer::new_for_http());

        Self {
            router,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
