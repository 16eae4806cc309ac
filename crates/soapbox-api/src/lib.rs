//! Mastodon-compatible API client library.
//!
//! Provides the HTTP transport, `Link` header pagination, the entity fetcher
//! that binds one request to one store list, and the streaming WebSocket
//! client whose events go through the same normalize-and-import path.

pub mod client;
pub mod endpoints;
pub mod fetcher;
pub mod links;
pub mod streaming;

pub use client::{ApiResponse, MastodonClient, Transport};
pub use endpoints::Timeline;
pub use fetcher::{EntityFetcher, EntityRequest, FetchError, FetchOutcome};
pub use streaming::{
    StreamEvent, StreamImporter, StreamMessage, StreamingClient, StreamingConfig,
};

use entity_store::StoreError;
use soapbox_schema::SchemaError;

/// Unified error type for the soapbox-api crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected payload: {0}")]
    Payload(String),

    #[error("Invalid record: {0}")]
    Schema(#[from] SchemaError),

    #[error("Entity store error: {0}")]
    Store(#[from] StoreError),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("Access token is not a valid header value")]
    InvalidToken,

    #[error("Connection timeout")]
    Timeout,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}
