//! Streaming API client.
//!
//! Connects to `/api/v1/streaming`, subscribes to the configured streams and
//! forwards parsed events over an mpsc channel. Lost connections are retried
//! with exponential backoff. Events are applied to the store by
//! [`StreamImporter`] through the same normalizers as fetched pages.

mod connection;
mod event;
mod importer;
#[cfg(test)]
mod tests;

pub use event::{StreamEvent, StreamMessage};
pub use importer::{StreamImporter, timeline_key};

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use soapbox_schema::Instance;
use tokio::sync::mpsc;
use url::Url;

use crate::ApiError;

const STREAMING_PATH: &str = "/api/v1/streaming";
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// A connection that stayed open this long counts as recovered.
const STABLE_CONNECTION: Duration = Duration::from_secs(5 * 60);
const MAX_ATTEMPTS: u32 = 8;

pub const STREAM_USER: &str = "user";
pub const STREAM_PUBLIC: &str = "public";
pub const STREAM_LOCAL: &str = "public:local";

/// Streaming connection settings.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// WebSocket endpoint, without credentials.
    pub streaming_url: Url,
    pub access_token: Option<String>,
    /// Stream names: `user`, `public`, `public:local`, `hashtag:<tag>`,
    /// `list:<id>` or `direct`.
    pub streams: Vec<String>,
}

impl StreamingConfig {
    /// Derive the WebSocket endpoint from the server's HTTP base URL.
    pub fn new(
        base_url: &Url,
        access_token: Option<String>,
        streams: Vec<String>,
    ) -> Result<Self, ApiError> {
        let mut streaming_url = base_url.join(STREAMING_PATH)?;
        let scheme = match base_url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        streaming_url
            .set_scheme(scheme)
            .map_err(|_| ApiError::Streaming(format!("cannot stream from {base_url}")))?;
        Ok(Self {
            streaming_url,
            access_token: access_token.filter(|token| !token.is_empty()),
            streams,
        })
    }

    /// Prefer the streaming host the instance advertises under
    /// `urls.streaming_api`, which may differ from the web host.
    pub fn for_instance(
        instance: &Instance,
        base_url: &Url,
        access_token: Option<String>,
        streams: Vec<String>,
    ) -> Result<Self, ApiError> {
        let advertised = instance
            .extra
            .get("urls")
            .and_then(|urls| urls.get("streaming_api"))
            .and_then(Value::as_str)
            .and_then(|url| Url::parse(url).ok());
        match advertised {
            Some(url) => Self::new(&url, access_token, streams),
            None => Self::new(base_url, access_token, streams),
        }
    }

    /// Endpoint with the access token attached.
    pub(super) fn socket_url(&self) -> Url {
        let mut url = self.streaming_url.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        url
    }
}

/// Subscribe frame for a stream name.
pub(super) fn subscribe_frame(stream: &str) -> Value {
    match stream.split_once(':') {
        Some(("hashtag", tag)) => json!({ "type": "subscribe", "stream": "hashtag", "tag": tag }),
        Some(("list", list)) => json!({ "type": "subscribe", "stream": "list", "list": list }),
        _ => json!({ "type": "subscribe", "stream": stream }),
    }
}

/// Streaming client with auto-reconnect.
///
/// Events are delivered via `mpsc::Receiver<StreamMessage>`.
pub struct StreamingClient;

impl StreamingClient {
    /// Start the streaming loop. Returns an event receiver and shutdown sender.
    pub async fn connect(
        config: StreamingConfig,
    ) -> Result<(mpsc::Receiver<StreamMessage>, mpsc::Sender<()>), ApiError> {
        if config.streams.is_empty() {
            return Err(ApiError::Streaming("no streams requested".into()));
        }
        let (event_tx, event_rx) = mpsc::channel::<StreamMessage>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, event_tx, shutdown_rx));
        Ok((event_rx, shutdown_tx))
    }

    async fn run_loop(
        config: StreamingConfig,
        event_tx: mpsc::Sender<StreamMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut reconnect = Reconnect::default();
        while shutdown_rx.try_recv().is_err() {
            let opened_at = Instant::now();
            let error = match Self::connect_once(&config, &event_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Streaming connection closed cleanly");
                    return;
                }
                Err(error) if Self::is_auth_error(&error) => {
                    tracing::warn!(error = %error, "Streaming rejected the access token");
                    return;
                }
                Err(error) => error,
            };
            let Some(delay) = reconnect.after_failure(opened_at.elapsed()) else {
                tracing::warn!(attempts = reconnect.attempts, "Streaming unavailable, giving up");
                return;
            };
            tracing::debug!(
                error = %error,
                attempt = reconnect.attempts,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to streaming API"
            );
            if tokio::time::timeout(delay, shutdown_rx.recv()).await.is_ok() {
                break;
            }
        }
        tracing::info!("Streaming stopped");
    }

    fn is_auth_error(error: &ApiError) -> bool {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match error {
            ApiError::Status { status, .. } => matches!(status, 401 | 403),
            ApiError::WebSocket(WsError::Http(response)) => {
                matches!(response.status().as_u16(), 401 | 403)
            }
            ApiError::InvalidToken => true,
            _ => false,
        }
    }
}

/// Retry bookkeeping for the streaming loop.
#[derive(Debug, Default)]
struct Reconnect {
    attempts: u32,
}

impl Reconnect {
    /// Delay before the next attempt, or `None` once attempts are exhausted.
    /// `connected_for` is how long the failed connection had been open.
    fn after_failure(&mut self, connected_for: Duration) -> Option<Duration> {
        if connected_for >= STABLE_CONNECTION {
            self.attempts = 0;
        }
        self.attempts += 1;
        (self.attempts < MAX_ATTEMPTS).then(|| {
            let exponent = self.attempts.saturating_sub(1).min(16);
            (BASE_BACKOFF * (1u32 << exponent)).min(MAX_BACKOFF)
        })
    }
}
