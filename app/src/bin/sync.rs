//! Headless sync binary.
//!
//! Loads the configured timeline into the entity store and, when enabled,
//! follows the streaming API until Ctrl+C.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use soapbox_api::{MastodonClient, StreamingConfig};
use soapbox_api::streaming::{STREAM_LOCAL, STREAM_PUBLIC, STREAM_USER};
use soapbox_api::Timeline;
use soapbox_sync_lib::session::Session;
use soapbox_sync_lib::sync;

/// Stream feeding the synced timeline, plus the user stream for
/// notifications when logged in.
fn streams_for(timeline: &Timeline, logged_in: bool) -> Vec<String> {
    let mut streams = Vec::new();
    if logged_in {
        streams.push(STREAM_USER.to_string());
    }
    match timeline {
        Timeline::Public => streams.push(STREAM_PUBLIC.to_string()),
        Timeline::Local => streams.push(STREAM_LOCAL.to_string()),
        Timeline::Hashtag(tag) => streams.push(format!("hashtag:{tag}")),
        Timeline::List(id) if logged_in => streams.push(format!("list:{id}")),
        _ => {}
    }
    streams
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting soapbox-sync");

    let (config, _status) = soapbox_sync_lib::init_config()?;
    let client = Arc::new(MastodonClient::new(
        &config.base_url,
        config.access_token.clone(),
        config.request_timeout,
    )?);

    let instance = sync::detect_server(&client).await;
    let features = sync::features_of(instance.as_ref());
    let session = Session::new(client.clone());

    let summary = sync::sync_timeline(session.fetcher(), &config.timeline, &features, config.pages).await?;
    if summary.skipped {
        tracing::warn!(list_key = %summary.list_key, "Nothing synced");
    }

    let streams = streams_for(&config.timeline, config.access_token.is_some());
    if config.streaming && features.streaming && !streams.is_empty() {
        let streaming = match &instance {
            Some(instance) => StreamingConfig::for_instance(
                instance,
                client.base_url(),
                config.access_token.clone(),
                streams,
            )?,
            None => StreamingConfig::new(client.base_url(), config.access_token.clone(), streams)?,
        };
        session.start_streaming(streaming).await?;
        tracing::info!("Following the streaming API. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down...");
        if let Some(applied) = session.stop_streaming().await {
            tracing::info!(applied, "Streaming events applied");
        }
    } else if config.streaming {
        tracing::warn!("Streaming requested but not available for this server or timeline");
    }

    let timeline = session.fetcher().query::<soapbox_schema::Status>(&config.timeline.request())?;
    tracing::info!(
        list_key = %summary.list_key,
        pages = summary.pages,
        statuses = timeline.entities.len(),
        has_next_page = timeline.has_next_page(),
        "Sync finished"
    );

    session.logout().await?;
    Ok(())
}
