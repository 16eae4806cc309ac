//! In-memory entity cache for normalized API records.
//!
//! Records are kept per entity type and id. Named lists hold ordered id
//! sequences plus pagination state and are resolved against the records on
//! every read, so a list never hands out a record that was deleted.

mod entities;
mod list;
mod lists;
mod query;
mod records;
#[cfg(test)]
mod tests;

pub use entities::{Entities, Entity, RelatedEntity};
pub use list::{EntityList, ListDirection, ListImport, ListState, ListToken, PageCursor, PageInfo};
pub use query::EntitiesQuery;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use entities::Record;

/// Shared handle to the entity cache of one session.
///
/// Cloning the handle is cheap; all clones see the same records. The store is
/// created when a session starts and [`EntityStore::reset`] is called on
/// logout or account switch.
#[derive(Clone, Default)]
pub struct EntityStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
pub(crate) struct StoreState {
    /// Bumped by every reset; tokens from an older epoch are stale.
    pub(crate) epoch: u64,
    pub(crate) next_generation: u64,
    pub(crate) caches: HashMap<Entities, EntityCache>,
}

#[derive(Default)]
pub(crate) struct EntityCache {
    pub(crate) store: HashMap<String, Record>,
    pub(crate) lists: HashMap<String, EntityList>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the store state with a closure while holding the lock.
    pub(crate) fn with_state<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut StoreState) -> R,
    {
        let mut state = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&mut state))
    }

    /// Drop every record and list. In-flight fetches started before the reset
    /// will find their tokens stale and leave the store alone.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.with_state(|state| {
            state.caches.clear();
            state.epoch += 1;
            tracing::debug!(epoch = state.epoch, "Entity store reset");
        })
    }
}

impl StoreState {
    pub(crate) fn cache(&self, entity: Entities) -> Option<&EntityCache> {
        self.caches.get(&entity)
    }

    pub(crate) fn cache_mut(&mut self, entity: Entities) -> &mut EntityCache {
        self.caches.entry(entity).or_default()
    }

    /// Insert a record and everything embedded in it. Records without an id
    /// cannot be addressed and are skipped.
    pub(crate) fn insert(&mut self, related: RelatedEntity) {
        let RelatedEntity {
            entity,
            id,
            record,
            related,
        } = related;
        for nested in related {
            self.insert(nested);
        }
        if id.is_empty() {
            tracing::trace!(%entity, "Skipping record without id");
            return;
        }
        self.cache_mut(entity).store.insert(id, record);
    }

    pub(crate) fn list_or_create(
        &mut self,
        entity: Entities,
        list_key: &str,
        direction: ListDirection,
    ) -> &mut EntityList {
        let next_generation = &mut self.next_generation;
        self.caches
            .entry(entity)
            .or_default()
            .lists
            .entry(list_key.to_string())
            .or_insert_with(|| {
                *next_generation += 1;
                EntityList::new(direction, *next_generation)
            })
    }

    /// Look up a list only if `token` still refers to it.
    pub(crate) fn list_for_token(
        &mut self,
        entity: Entities,
        list_key: &str,
        token: ListToken,
    ) -> Option<&mut EntityList> {
        if token.epoch != self.epoch {
            return None;
        }
        self.caches
            .get_mut(&entity)?
            .lists
            .get_mut(list_key)
            .filter(|list| list.generation == token.generation)
    }
}

/// Entity store error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entity store lock poisoned")]
    LockPoisoned,
}
