//! List-level operations: ordered id sequences with pagination state.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::entities::RelatedEntity;
use crate::{
    Entities, Entity, EntityStore, ListDirection, ListImport, ListState, ListToken, PageCursor,
    StoreError,
};

impl EntityStore {
    /// Import records and merge their ids into a list, creating the list if
    /// needed. Cursors are left as they are.
    pub fn import_list<E: Entity>(
        &self,
        list_key: &str,
        records: Vec<E>,
        mode: ListImport,
    ) -> Result<Vec<String>, StoreError> {
        self.with_state(|state| {
            let ids = insert_all(state, records);
            state
                .list_or_create(E::ENTITY, list_key, ListDirection::default())
                .apply(ids.clone(), mode);
            ids
        })
    }

    /// Mark a list as fetching and return the token the result must be
    /// applied with. Creates the list with `direction` if it does not exist.
    pub fn begin_fetch(
        &self,
        entity: Entities,
        list_key: &str,
        direction: ListDirection,
    ) -> Result<ListToken, StoreError> {
        self.with_state(|state| {
            let epoch = state.epoch;
            let list = state.list_or_create(entity, list_key, direction);
            list.state.fetching = true;
            ListToken {
                epoch,
                generation: list.generation,
            }
        })
    }

    /// Apply a fetched page. Returns `false` and changes nothing when the
    /// token is stale (list removed or store reset since the fetch began).
    pub fn import_page<E: Entity>(
        &self,
        token: ListToken,
        list_key: &str,
        records: Vec<E>,
        page: PageCursor,
    ) -> Result<bool, StoreError> {
        self.with_state(|state| {
            if state.list_for_token(E::ENTITY, list_key, token).is_none() {
                tracing::debug!(entity = %E::ENTITY, list_key, "Dropping stale page");
                return false;
            }
            let ids = insert_all(state, records);
            let Some(list) = state.list_for_token(E::ENTITY, list_key, token) else {
                return false;
            };
            let mode = list.apply_cursor(page);
            list.apply(ids, mode);
            list.state.fetching = false;
            list.state.fetched = true;
            list.state.invalid = false;
            list.state.error = None;
            list.state.last_fetched_at = Some(Utc::now());
            true
        })
    }

    /// Record a failed fetch. Ids, records and cursors are left untouched.
    pub fn fail_fetch(
        &self,
        entity: Entities,
        list_key: &str,
        token: ListToken,
        error: String,
    ) -> Result<bool, StoreError> {
        self.with_state(|state| match state.list_for_token(entity, list_key, token) {
            Some(list) => {
                list.state.fetching = false;
                list.state.error = Some(error);
                true
            }
            None => false,
        })
    }

    /// Import a record pushed by the streaming API and insert it into
    /// `list_key` at the list's streaming position. Lists nobody has fetched
    /// are not created; the record is still imported.
    pub fn insert_streamed<E: Entity>(&self, list_key: &str, record: E) -> Result<bool, StoreError> {
        self.with_state(|state| {
            let id = record.id().to_string();
            state.insert(RelatedEntity::from_arc(Arc::new(record)));
            let Some(list) = state
                .caches
                .get_mut(&E::ENTITY)
                .and_then(|cache| cache.lists.get_mut(list_key))
            else {
                return false;
            };
            let mode = list.state.direction.streamed();
            list.apply(vec![id], mode);
            true
        })
    }

    /// Remove ids from one list without deleting the records.
    pub fn dismiss(
        &self,
        entity: Entities,
        list_key: &str,
        ids: &[&str],
    ) -> Result<usize, StoreError> {
        let targets: HashSet<&str> = ids.iter().copied().collect();
        self.with_state(|state| {
            state
                .caches
                .get_mut(&entity)
                .and_then(|cache| cache.lists.get_mut(list_key))
                .map_or(0, |list| list.remove(&targets))
        })
    }

    /// Flag a list for refetching while keeping its contents readable.
    pub fn invalidate_list(&self, entity: Entities, list_key: &str) -> Result<bool, StoreError> {
        self.with_state(|state| {
            match state
                .caches
                .get_mut(&entity)
                .and_then(|cache| cache.lists.get_mut(list_key))
            {
                Some(list) => {
                    list.state.invalid = true;
                    true
                }
                None => false,
            }
        })
    }

    /// Forget a list entirely. Fetches still in flight for it become stale.
    pub fn remove_list(&self, entity: Entities, list_key: &str) -> Result<bool, StoreError> {
        self.with_state(|state| {
            state
                .caches
                .get_mut(&entity)
                .is_some_and(|cache| cache.lists.remove(list_key).is_some())
        })
    }

    pub fn list_ids(&self, entity: Entities, list_key: &str) -> Result<Vec<String>, StoreError> {
        self.with_state(|state| {
            state
                .cache(entity)
                .and_then(|cache| cache.lists.get(list_key))
                .map(|list| list.ids().to_vec())
                .unwrap_or_default()
        })
    }

    pub fn list_state(
        &self,
        entity: Entities,
        list_key: &str,
    ) -> Result<Option<ListState>, StoreError> {
        self.with_state(|state| {
            state
                .cache(entity)
                .and_then(|cache| cache.lists.get(list_key))
                .map(|list| list.state().clone())
        })
    }

    /// Keys of every list of one type.
    pub fn list_keys(&self, entity: Entities) -> Result<Vec<String>, StoreError> {
        self.with_state(|state| {
            state
                .cache(entity)
                .map(|cache| cache.lists.keys().cloned().collect())
                .unwrap_or_default()
        })
    }
}

fn insert_all<E: Entity>(state: &mut crate::StoreState, records: Vec<E>) -> Vec<String> {
    records
        .into_iter()
        .map(|record| {
            let id = record.id().to_string();
            state.insert(RelatedEntity::from_arc(Arc::new(record)));
            id
        })
        .collect()
}
