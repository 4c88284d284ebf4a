//! Model-pool health and fallback engine for freeroute
//!
//! Fetches the upstream free-tier model catalog, probes the models
//! concurrently to prune unresponsive ones, and routes live chat requests
//! through the resulting active pool with ordered retry-on-failure.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod classify;
pub mod client;
pub mod error;
pub mod memory;
pub mod pool;
pub mod probe;
pub mod recommend;
pub mod router;
pub mod state;
pub mod types;

pub use client::UpstreamClient;
pub use error::{RouterError, UpstreamError};
pub use router::llm_router;
pub use state::AppState;
pub use types::{ActiveModel, ChatRequest, Message};
