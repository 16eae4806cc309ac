use std::sync::Arc;

use crate::entities::downcast;
use crate::{Entity, EntityStore, ListState, StoreError};

/// A list resolved to its records plus the flags a view renders from.
#[derive(Debug, Clone)]
pub struct EntitiesQuery<E> {
    pub entities: Vec<Arc<E>>,
    pub state: ListState,
}

impl<E> EntitiesQuery<E> {
    pub fn is_fetching(&self) -> bool {
        self.state.fetching
    }

    /// Fetching with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.state.fetching && self.entities.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.state.next.is_some()
    }

    pub fn has_previous_page(&self) -> bool {
        self.state.prev.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.state.error.is_some()
    }

    pub fn is_invalid(&self) -> bool {
        self.state.invalid
    }
}

impl EntityStore {
    /// Resolve a list to its records in list order. Ids whose record is gone
    /// are skipped rather than reported.
    pub fn list<E: Entity>(&self, list_key: &str) -> Result<Vec<Arc<E>>, StoreError> {
        Ok(self.query::<E>(list_key)?.entities)
    }

    /// Resolve a list together with its state. An unknown list reads as empty.
    pub fn query<E: Entity>(&self, list_key: &str) -> Result<EntitiesQuery<E>, StoreError> {
        self.with_state(|state| {
            let Some(cache) = state.cache(E::ENTITY) else {
                return EntitiesQuery {
                    entities: Vec::new(),
                    state: ListState::default(),
                };
            };
            let Some(list) = cache.lists.get(list_key) else {
                return EntitiesQuery {
                    entities: Vec::new(),
                    state: ListState::default(),
                };
            };
            let entities = list
                .ids()
                .iter()
                .filter_map(|id| cache.store.get(id))
                .filter_map(downcast::<E>)
                .collect();
            EntitiesQuery {
                entities,
                state: list.state().clone(),
            }
        })
    }
}
