//! Binds one request to one store list.
//!
//! [`EntityFetcher`] issues the request, normalizes the response through
//! [`Normalize::parse`], and applies the page with a list token so results
//! arriving after a reset or list removal are dropped. Concurrent fetches of
//! the same (entity, list key) share one network request.

mod inflight;

use std::sync::Arc;

use entity_store::{
    Entities, EntitiesQuery, Entity, EntityStore, ListDirection, ListToken, PageCursor,
    StoreError,
};
use serde_json::Value;
use soapbox_schema::Normalize;

use crate::client::Transport;
use crate::ApiError;

use inflight::InflightRequests;

/// A list endpoint and the list its results are stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest {
    pub entity: Entities,
    pub list_key: String,
    pub path: String,
    pub direction: ListDirection,
    /// Disabled requests never touch the network, e.g. when the server lacks
    /// the feature.
    pub enabled: bool,
}

impl EntityRequest {
    pub fn new(entity: Entities, list_key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            entity,
            list_key: list_key.into(),
            path: path.into(),
            direction: ListDirection::NewestFirst,
            enabled: true,
        }
    }

    pub fn direction(mut self, direction: ListDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Result of a list fetch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page applied to the list.
    Applied { count: usize, has_next_page: bool },
    /// Request is disabled.
    Skipped,
    /// No cursor to follow.
    NoMorePages,
    /// Store was reset or the list removed while the request was in flight.
    Stale,
}

/// Fetch failure shared by every caller collapsed onto one request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(Arc<ApiError>),

    #[error("Fetch was cancelled before it settled")]
    Cancelled,
}

impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        Self::Api(Arc::new(e))
    }
}

impl From<StoreError> for FetchError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    First,
    Next,
    Previous,
}

pub struct EntityFetcher<T> {
    transport: Arc<T>,
    store: EntityStore,
    inflight: InflightRequests,
}

impl<T: Transport> EntityFetcher<T> {
    pub fn new(transport: Arc<T>, store: EntityStore) -> Self {
        Self {
            transport,
            store,
            inflight: InflightRequests::default(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Fetch the first page, replacing the list's ids and cursors.
    pub async fn fetch<E: Entity + Normalize>(
        &self,
        request: &EntityRequest,
    ) -> Result<FetchOutcome, FetchError> {
        self.run::<E>(request, Page::First).await
    }

    /// Follow the stored `next` cursor. No-op when there is none.
    pub async fn fetch_next_page<E: Entity + Normalize>(
        &self,
        request: &EntityRequest,
    ) -> Result<FetchOutcome, FetchError> {
        self.run::<E>(request, Page::Next).await
    }

    /// Follow the stored `prev` cursor. No-op when there is none.
    pub async fn fetch_previous_page<E: Entity + Normalize>(
        &self,
        request: &EntityRequest,
    ) -> Result<FetchOutcome, FetchError> {
        self.run::<E>(request, Page::Previous).await
    }

    /// Fetch and import a single record. Unlike list items, a record without
    /// its id fails the fetch.
    pub async fn fetch_entity<E: Entity + Normalize>(&self, path: &str) -> Result<Arc<E>, FetchError> {
        let response = self.transport.get(path).await?;
        let record = E::parse(&response.json()?).map_err(ApiError::from)?;
        tracing::debug!(entity = %E::ENTITY, id = record.id(), "Fetched entity");
        Ok(self.store.import(record)?)
    }

    /// Hydrated list plus its loading flags.
    pub fn query<E: Entity>(&self, request: &EntityRequest) -> Result<EntitiesQuery<E>, FetchError> {
        Ok(self.store.query::<E>(&request.list_key)?)
    }

    async fn run<E: Entity + Normalize>(
        &self,
        request: &EntityRequest,
        page: Page,
    ) -> Result<FetchOutcome, FetchError> {
        if !request.enabled {
            return Ok(FetchOutcome::Skipped);
        }
        let key = (E::ENTITY, request.list_key.clone());
        let slot = match self.inflight.join(key) {
            inflight::Join::Waiter(waiter) => {
                tracing::debug!(entity = %E::ENTITY, list_key = %request.list_key, "Joining in-flight fetch");
                return waiter.wait().await;
            }
            inflight::Join::Leader(slot) => slot,
        };
        let result = self.execute::<E>(request, page).await;
        slot.settle(result.clone());
        result
    }

    async fn execute<E: Entity + Normalize>(
        &self,
        request: &EntityRequest,
        page: Page,
    ) -> Result<FetchOutcome, FetchError> {
        let entity = E::ENTITY;
        let list_key = request.list_key.as_str();

        let url = match page {
            Page::First => request.path.clone(),
            Page::Next | Page::Previous => {
                let state = self.store.list_state(entity, list_key)?;
                let cursor = state.and_then(|state| match page {
                    Page::Next => state.next,
                    _ => state.prev,
                });
                match cursor {
                    Some(cursor) => cursor,
                    None => return Ok(FetchOutcome::NoMorePages),
                }
            }
        };

        let token = self.store.begin_fetch(entity, list_key, request.direction)?;
        let mut pending = PendingFetch {
            store: &self.store,
            entity,
            list_key,
            token: Some(token),
        };
        tracing::debug!(%entity, list_key, %url, ?page, "Fetching page");

        let fetched = match self.transport.get(&url).await {
            Ok(response) => parse_page::<E>(&response).map(|records| (records, response.page_info())),
            Err(e) => Err(e),
        };
        let (mut records, info) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(%entity, list_key, %url, "Fetch failed: {e}");
                pending.token = None;
                self.store.fail_fetch(entity, list_key, token, e.to_string())?;
                return Err(e.into());
            }
        };
        pending.token = None;

        // Servers return newest first.
        if request.direction == ListDirection::OldestFirst {
            records.reverse();
        }
        let count = records.len();
        let cursor = match page {
            Page::First => PageCursor::First(info),
            Page::Next => PageCursor::Next(info),
            Page::Previous => PageCursor::Previous(info),
        };

        if !self.store.import_page(token, list_key, records, cursor)? {
            return Ok(FetchOutcome::Stale);
        }
        let has_next_page = self
            .store
            .list_state(entity, list_key)?
            .is_some_and(|state| state.next.is_some());
        tracing::debug!(%entity, list_key, count, has_next_page, "Applied page");
        Ok(FetchOutcome::Applied {
            count,
            has_next_page,
        })
    }
}

/// Clears the list's fetching flag when a fetch is dropped mid-request.
struct PendingFetch<'a> {
    store: &'a EntityStore,
    entity: Entities,
    list_key: &'a str,
    token: Option<ListToken>,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            tracing::debug!(entity = %self.entity, list_key = self.list_key, "Fetch cancelled");
            let _ = self.store.fail_fetch(
                self.entity,
                self.list_key,
                token,
                FetchError::Cancelled.to_string(),
            );
        }
    }
}

/// Normalize every item of a list response. Items that cannot be identified
/// are dropped; a body that is not an array fails the page.
fn parse_page<E: Entity + Normalize>(
    response: &crate::client::ApiResponse,
) -> Result<Vec<E>, ApiError> {
    let Value::Array(items) = response.json()? else {
        return Err(ApiError::Payload(format!(
            "expected an array of {}",
            E::ENTITY
        )));
    };
    let mut records = Vec::with_capacity(items.len());
    for item in &items {
        match E::parse(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(entity = %E::ENTITY, "Dropping list item: {e}"),
        }
    }
    Ok(records)
}
