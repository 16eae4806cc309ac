//! Session lifecycle.
//!
//! A [`Session`] owns the entity store, the fetcher bound to it and the
//! streaming task feeding it. Logging out or switching accounts resets the
//! store, so in-flight fetches from the old session apply nothing.

use std::sync::Arc;

use entity_store::{EntityStore, StoreError};
use soapbox_api::{
    ApiError, EntityFetcher, MastodonClient, StreamImporter, StreamMessage, StreamingClient,
    StreamingConfig, Transport,
};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

struct StreamingHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<usize>,
}

pub struct Session<T: Transport = MastodonClient> {
    store: EntityStore,
    fetcher: EntityFetcher<T>,
    streaming: Mutex<Option<StreamingHandle>>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: Arc<T>) -> Self {
        let store = EntityStore::new();
        Self {
            fetcher: EntityFetcher::new(transport, store.clone()),
            store,
            streaming: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn fetcher(&self) -> &EntityFetcher<T> {
        &self.fetcher
    }

    /// Connect to the streaming API and import its events until stopped.
    pub async fn start_streaming(&self, config: StreamingConfig) -> Result<(), ApiError> {
        let (event_rx, shutdown_tx) = StreamingClient::connect(config).await?;
        self.attach_stream(event_rx, shutdown_tx).await;
        Ok(())
    }

    /// Import events from `event_rx` on a background task. A previously
    /// attached stream is stopped first.
    pub async fn attach_stream(
        &self,
        mut event_rx: mpsc::Receiver<StreamMessage>,
        shutdown_tx: mpsc::Sender<()>,
    ) {
        self.stop_streaming().await;
        let importer = StreamImporter::new(self.store.clone());
        let task = tokio::spawn(async move {
            let mut applied = 0;
            while let Some(message) = event_rx.recv().await {
                match importer.apply(&message) {
                    Ok(true) => applied += 1,
                    Ok(false) => {}
                    Err(e) => tracing::warn!(event = message.event.name(), "Failed to apply streaming event: {e}"),
                }
            }
            tracing::info!(applied, "Streaming importer stopped");
            applied
        });
        *self.streaming.lock().await = Some(StreamingHandle { shutdown_tx, task });
    }

    /// Stop streaming. Returns the number of events that changed the store,
    /// or `None` when no stream was attached.
    pub async fn stop_streaming(&self) -> Option<usize> {
        let handle = self.streaming.lock().await.take()?;
        if handle.shutdown_tx.send(()).await.is_ok() {
            tracing::info!("Streaming stop signal sent");
        }
        // The importer only ends once the event channel closes; a stream that
        // ignores the shutdown signal is aborted.
        let mut task = handle.task;
        match tokio::time::timeout(std::time::Duration::from_secs(2), &mut task).await {
            Ok(Ok(applied)) => Some(applied),
            Ok(Err(e)) => {
                tracing::warn!("Streaming importer task failed: {e}");
                Some(0)
            }
            Err(_) => {
                task.abort();
                Some(0)
            }
        }
    }

    pub async fn is_streaming(&self) -> bool {
        self.streaming.lock().await.is_some()
    }

    /// End the session: stop streaming and drop every cached record.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.stop_streaming().await;
        self.store.reset()?;
        tracing::info!("Session logged out");
        Ok(())
    }

    /// Continue with another account's transport on the same store handle.
    /// The store is reset so nothing from the previous account leaks.
    pub async fn switch_account(&mut self, transport: Arc<T>) -> Result<(), StoreError> {
        self.stop_streaming().await;
        self.store.reset()?;
        self.fetcher = EntityFetcher::new(transport, self.store.clone());
        tracing::info!("Session switched account");
        Ok(())
    }
}
