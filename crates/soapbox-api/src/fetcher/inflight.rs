//! In-flight request map keyed by (entity, list key).
//!
//! The first caller becomes the leader and performs the request; later callers
//! wait on a watch channel for the leader's result. The entry is removed when
//! the leader settles or is dropped, so a cancelled leader wakes its waiters
//! with [`FetchError::Cancelled`] instead of leaving them hanging.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use entity_store::Entities;
use tokio::sync::watch;

use super::{FetchError, FetchOutcome};

type Settled = Option<Result<FetchOutcome, FetchError>>;
type Key = (Entities, String);

#[derive(Default, Clone)]
pub(super) struct InflightRequests {
    map: Arc<Mutex<HashMap<Key, watch::Receiver<Settled>>>>,
}

pub(super) enum Join {
    Leader(Slot),
    Waiter(Waiter),
}

pub(super) struct Slot {
    requests: InflightRequests,
    key: Key,
    tx: watch::Sender<Settled>,
}

pub(super) struct Waiter {
    rx: watch::Receiver<Settled>,
}

impl InflightRequests {
    pub(super) fn join(&self, key: Key) -> Join {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = map.get(&key) {
            return Join::Waiter(Waiter { rx: rx.clone() });
        }
        let (tx, rx) = watch::channel(None);
        map.insert(key.clone(), rx);
        Join::Leader(Slot {
            requests: self.clone(),
            key,
            tx,
        })
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Slot {
    /// Publish the result to every waiter and clear the entry.
    pub(super) fn settle(self, result: Result<FetchOutcome, FetchError>) {
        // No receivers left is fine.
        let _ = self.tx.send(Some(result));
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.requests
            .map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl Waiter {
    pub(super) async fn wait(mut self) -> Result<FetchOutcome, FetchError> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(settled) => settled.clone().unwrap_or(Err(FetchError::Cancelled)),
            Err(_) => Err(FetchError::Cancelled),
        }
    }
}
