//! Client-side state layer for the panel front-end: an in-memory cache of the
//! three entity collections, the HTTP client it refreshes through, a local
//! JSON mirror for read continuity across sessions, and the pure statistics
//! and filtering helpers the pages render from.

pub mod api;
pub mod cache;
pub mod filter;
pub mod mirror;
pub mod stats;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("local mirror error: {0}")]
    Store(String),
}
