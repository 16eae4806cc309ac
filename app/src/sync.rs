//! Timeline sync: load the first pages of a timeline into the store.

use serde::Serialize;
use soapbox_api::{EntityFetcher, FetchError, FetchOutcome, MastodonClient, Timeline, Transport};
use soapbox_schema::{Features, Instance, Status};

/// What a sync run loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub list_key: String,
    pub pages: u32,
    pub statuses: usize,
    pub has_more: bool,
    /// The server lacks the feature the timeline needs.
    pub skipped: bool,
}

/// Whether the timeline can be fetched from a server with `features`.
pub fn timeline_enabled(timeline: &Timeline, features: &Features) -> bool {
    match timeline {
        Timeline::Bookmarks => features.bookmarks,
        _ => true,
    }
}

/// Fetch up to `pages` pages of `timeline`, stopping early when the server
/// reports no further page.
pub async fn sync_timeline<T: Transport>(
    fetcher: &EntityFetcher<T>,
    timeline: &Timeline,
    features: &Features,
    pages: u32,
) -> Result<SyncSummary, FetchError> {
    let request = timeline.request().enabled(timeline_enabled(timeline, features));
    let mut summary = SyncSummary {
        list_key: request.list_key.clone(),
        ..SyncSummary::default()
    };

    let mut outcome = fetcher.fetch::<Status>(&request).await?;
    for page in 1..=pages.max(1) {
        match outcome {
            FetchOutcome::Applied { has_next_page, .. } => {
                summary.pages = page;
                summary.has_more = has_next_page;
                if !has_next_page || page == pages.max(1) {
                    break;
                }
            }
            FetchOutcome::Skipped => {
                tracing::warn!(list_key = %summary.list_key, "Timeline not supported by this server");
                summary.skipped = true;
                break;
            }
            FetchOutcome::NoMorePages | FetchOutcome::Stale => break,
        }
        outcome = fetcher.fetch_next_page::<Status>(&request).await?;
    }

    summary.statuses = fetcher.query::<Status>(&request)?.entities.len();
    tracing::info!(
        list_key = %summary.list_key,
        pages = summary.pages,
        statuses = summary.statuses,
        has_more = summary.has_more,
        "Timeline synced"
    );
    Ok(summary)
}

/// Fetch the instance to learn the server dialect. A server whose instance
/// endpoint fails is treated as having no optional features.
pub async fn detect_server(client: &MastodonClient) -> Option<Instance> {
    match client.instance().await {
        Ok(instance) => {
            let backend = instance.backend();
            tracing::info!(
                dialect = %backend.dialect,
                version = %backend.version,
                title = %instance.title,
                "Detected server"
            );
            Some(instance)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch instance, assuming no optional features: {e}");
            None
        }
    }
}

pub fn features_of(instance: Option<&Instance>) -> Features {
    instance.map(Instance::features).unwrap_or_default()
}
