//! Shared primitives for freeroute crates

mod error;

pub use error::HttpError;
