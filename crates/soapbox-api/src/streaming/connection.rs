use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use super::*;

impl StreamingClient {
    /// Run one connection until shutdown (`Ok`) or failure (`Err`).
    pub(super) async fn connect_once(
        config: &StreamingConfig,
        event_tx: &mpsc::Sender<StreamMessage>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<(), ApiError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(url = %config.streaming_url, "Connecting to streaming API");
        let (mut ws, _) = connect_async(config.socket_url().as_str()).await?;
        for stream in &config.streams {
            ws.send(Msg::Text(subscribe_frame(stream).to_string().into()))
                .await?;
            tracing::info!(stream = %stream, "Subscribed to stream");
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Streaming shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(IDLE_TIMEOUT, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(text)))) => Self::handle_message(&text, event_tx).await,
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("Streaming WebSocket closed by server");
                            return Err(ApiError::Streaming("Server closed".into()));
                        }
                        Ok(Some(Err(e))) => return Err(ApiError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("Streaming idle timeout");
                            return Err(ApiError::Timeout);
                        }
                    }
                }
            }
        }
    }

    /// Parse and forward one frame. Unparseable frames are logged and skipped
    /// so one bad payload does not drop the connection.
    async fn handle_message(text: &str, event_tx: &mpsc::Sender<StreamMessage>) {
        match StreamMessage::parse(text) {
            Ok(message) => {
                tracing::debug!(event = message.event.name(), stream = ?message.stream, "Streaming event");
                let _ = event_tx.send(message).await;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring malformed streaming frame"),
        }
    }
}
