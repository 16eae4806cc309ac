//! Record-level operations: import, lookup and deletion by id.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::downcast;
use crate::{Entities, Entity, EntityStore, RelatedEntity, StoreError};

impl EntityStore {
    /// Insert or replace a record (last write wins) along with the records
    /// embedded in it.
    pub fn import<E: Entity>(&self, record: E) -> Result<Arc<E>, StoreError> {
        let record = Arc::new(record);
        let stored = record.clone();
        self.with_state(|state| state.insert(RelatedEntity::from_arc(stored)))?;
        Ok(record)
    }

    /// Insert or replace many records, returning their ids in input order.
    pub fn import_many<E: Entity>(&self, records: Vec<E>) -> Result<Vec<String>, StoreError> {
        self.with_state(|state| {
            records
                .into_iter()
                .map(|record| {
                    let id = record.id().to_string();
                    state.insert(RelatedEntity::from_arc(Arc::new(record)));
                    id
                })
                .filter(|id| !id.is_empty())
                .collect()
        })
    }

    /// Look up a record by id.
    pub fn get<E: Entity>(&self, id: &str) -> Result<Option<Arc<E>>, StoreError> {
        self.with_state(|state| {
            state
                .cache(E::ENTITY)
                .and_then(|cache| cache.store.get(id))
                .and_then(downcast::<E>)
        })
    }

    pub fn contains(&self, entity: Entities, id: &str) -> Result<bool, StoreError> {
        self.with_state(|state| {
            state
                .cache(entity)
                .is_some_and(|cache| cache.store.contains_key(id))
        })
    }

    /// Number of records of one type.
    pub fn count(&self, entity: Entities) -> Result<usize, StoreError> {
        self.with_state(|state| state.cache(entity).map_or(0, |cache| cache.store.len()))
    }

    /// Delete records. Unless `preserve_lists` is set, the ids are also removed
    /// from every list of that type. Returns the number of records deleted.
    pub fn delete_entities(
        &self,
        entity: Entities,
        ids: &[&str],
        preserve_lists: bool,
    ) -> Result<usize, StoreError> {
        let targets: HashSet<&str> = ids.iter().copied().collect();
        self.with_state(|state| {
            let Some(cache) = state.caches.get_mut(&entity) else {
                return 0;
            };
            let deleted = targets
                .iter()
                .filter(|id| cache.store.remove(**id).is_some())
                .count();
            if !preserve_lists {
                for list in cache.lists.values_mut() {
                    list.remove(&targets);
                }
            }
            tracing::debug!(%entity, deleted, preserve_lists, "Deleted entities");
            deleted
        })
    }

    /// Remove a record and its presence in every list of its type.
    pub fn invalidate(&self, entity: Entities, id: &str) -> Result<bool, StoreError> {
        Ok(self.delete_entities(entity, &[id], false)? > 0)
    }
}
