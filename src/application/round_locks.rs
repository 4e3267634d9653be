//! RoundLocks - Per-entity serialization of multi-step rounds.
//!
//! A play round reads the engine, awaits the ledger, then writes the
//! engine. The engine locks each step on its own, so the whole sequence
//! needs an outer per-entity lock held across the await points.
//!
//! Entries exist only while a round is running or waiting for one:
//! the last turn out removes the entity's lock, so the map stays bounded
//! by in-flight rounds rather than by every entity ever seen.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::EntityId;

type EntityLock = Arc<AsyncMutex<()>>;

/// Keyed async locks, one per entity with a round in flight.
#[derive(Debug, Default)]
pub struct RoundLocks {
    locks: Arc<Mutex<HashMap<EntityId, EntityLock>>>,
}

impl RoundLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other round for the entity is running, then holds
    /// the entity until the returned turn is dropped.
    pub async fn acquire(&self, entity_id: &EntityId) -> RoundTurn {
        // Clones happen under the map lock, so the strong count seen by a
        // releasing turn includes every waiter.
        let lock = self.locks.lock().entry(entity_id.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        RoundTurn {
            locks: self.locks.clone(),
            entity_id: entity_id.clone(),
            guard: Some(guard),
        }
    }

    /// Entities with a round running or waiting.
    pub fn in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Exclusive turn for one entity.
#[derive(Debug)]
pub struct RoundTurn {
    locks: Arc<Mutex<HashMap<EntityId, EntityLock>>>,
    entity_id: EntityId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoundTurn {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        self.guard.take();
        let unused = locks
            .get(&self.entity_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.entity_id);
        }
    }
}
