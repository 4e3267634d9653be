//! Cycle store - owns every tracked record.
//!
//! # Locking
//!
//! The map of records sits behind a `RwLock`; each record sits behind its
//! own `Mutex`. Callers take the map lock only long enough to find or
//! insert a record, then work under the record's lock alone, so traffic
//! for different entities never serializes on one lock.
//!
//! Sweeps take the map write lock and only `try_lock` records. A record a
//! caller is using is skipped until the next sweep. A removed record is
//! flagged `evicted` before it leaves the map, so a caller still holding
//! its handle sees the flag after locking and retries against a fresh
//! record instead of writing into a dead one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::domain::cycle::CycleRecord;
use crate::domain::foundation::{EntityId, Timestamp};

use super::eviction::{ActivityEntry, EvictionPolicy, SweepReport};

#[derive(Debug)]
struct Slot {
    record: CycleRecord,
    evicted: bool,
}

type SlotHandle = Arc<Mutex<Slot>>;

/// Observability snapshot of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub tracked: usize,
    pub created_total: u64,
    pub evicted_total: u64,
    pub last_sweep_at: Option<Timestamp>,
}

/// Process-local map from entity to cycle record.
#[derive(Debug, Default)]
pub struct CycleStore {
    slots: RwLock<HashMap<EntityId, SlotHandle>>,
    created_total: AtomicU64,
    evicted_total: AtomicU64,
    last_sweep_at: Mutex<Option<Timestamp>>,
}

impl CycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked records.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.slots.read().contains_key(entity_id)
    }

    /// Runs `f` on the entity's record, creating it with `create` first if
    /// it is not tracked.
    ///
    /// `f` runs under the record's lock and receives `true` when the record
    /// was created by this call. It must not call back into the store for
    /// the same entity.
    pub fn get_or_create<R>(
        &self,
        entity_id: &EntityId,
        create: impl Fn() -> CycleRecord,
        f: impl FnOnce(&mut CycleRecord, bool) -> R,
    ) -> R {
        loop {
            let (slot, created) = self.find_or_insert(entity_id, &create);
            let mut guard = slot.lock();
            if guard.evicted {
                continue;
            }
            return f(&mut guard.record, created);
        }
    }

    /// Runs `f` on the entity's record if it is tracked. Never creates.
    pub fn peek<R>(&self, entity_id: &EntityId, f: impl FnOnce(&mut CycleRecord) -> R) -> Option<R> {
        loop {
            let slot = self.slots.read().get(entity_id).cloned()?;
            let mut guard = slot.lock();
            if guard.evicted {
                continue;
            }
            return Some(f(&mut guard.record));
        }
    }

    /// Tracks `record` for the entity as-is, replacing any current record.
    ///
    /// The record is not validated here; every engine operation validates
    /// before use.
    pub fn insert(&self, entity_id: EntityId, record: CycleRecord) {
        let slot = Arc::new(Mutex::new(Slot {
            record,
            evicted: false,
        }));
        let previous = self.slots.write().insert(entity_id, slot);
        if let Some(previous) = previous {
            previous.lock().evicted = true;
        }
    }

    /// Drops the entity's record. The next access creates a fresh one.
    pub fn reset(&self, entity_id: &EntityId) -> bool {
        let removed = self.slots.write().remove(entity_id);
        match removed {
            Some(slot) => {
                slot.lock().evicted = true;
                true
            }
            None => false,
        }
    }

    /// Drops every record, returning the ids that were tracked.
    pub fn reset_all(&self) -> Vec<EntityId> {
        let drained: Vec<(EntityId, SlotHandle)> = self.slots.write().drain().collect();
        drained
            .into_iter()
            .map(|(entity_id, slot)| {
                slot.lock().evicted = true;
                entity_id
            })
            .collect()
    }

    /// Removes idle records, then the least recently active ones while
    /// the count is above the policy's cap.
    pub fn sweep(&self, policy: &EvictionPolicy, now: Timestamp) -> SweepReport {
        let mut slots = self.slots.write();
        let tracked = slots.len();

        let mut candidates = Vec::with_capacity(tracked);
        let mut skipped_busy = 0;
        for (entity_id, slot) in slots.iter() {
            match slot.try_lock() {
                Some(guard) => candidates.push(ActivityEntry {
                    entity_id: entity_id.clone(),
                    last_activity_at: guard.record.last_activity_at(),
                }),
                None => skipped_busy += 1,
            }
        }

        let plan = policy.plan(&candidates, tracked, now);
        if !plan.is_empty() {
            tracing::debug!(
                victims = plan.len(),
                idle = plan.idle.len(),
                capacity = plan.capacity.len(),
                skipped_busy,
                "Eviction victims selected"
            );
        }
        let seen: HashMap<&EntityId, Timestamp> = candidates
            .iter()
            .map(|entry| (&entry.entity_id, entry.last_activity_at))
            .collect();

        let mut evict = |victims: Vec<EntityId>| -> Vec<EntityId> {
            victims
                .into_iter()
                .filter(|entity_id| {
                    let Some(slot) = slots.get(entity_id).cloned() else {
                        return false;
                    };
                    let Some(mut guard) = slot.try_lock() else {
                        return false;
                    };
                    // Touched since the snapshot: no longer a valid victim.
                    if seen.get(entity_id) != Some(&guard.record.last_activity_at()) {
                        return false;
                    }
                    guard.evicted = true;
                    drop(guard);
                    slots.remove(entity_id);
                    true
                })
                .collect()
        };

        let idle_evicted = evict(plan.idle);
        let capacity_evicted = evict(plan.capacity);
        let remaining = slots.len();
        drop(slots);

        let evicted = (idle_evicted.len() + capacity_evicted.len()) as u64;
        self.evicted_total.fetch_add(evicted, Ordering::Relaxed);
        *self.last_sweep_at.lock() = Some(now);

        SweepReport {
            swept_at: now,
            idle_evicted,
            capacity_evicted,
            skipped_busy,
            remaining,
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            tracked: self.len(),
            created_total: self.created_total.load(Ordering::Relaxed),
            evicted_total: self.evicted_total.load(Ordering::Relaxed),
            last_sweep_at: *self.last_sweep_at.lock(),
        }
    }

    fn find_or_insert(
        &self,
        entity_id: &EntityId,
        create: &impl Fn() -> CycleRecord,
    ) -> (SlotHandle, bool) {
        if let Some(slot) = self.slots.read().get(entity_id) {
            return (slot.clone(), false);
        }

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get(entity_id) {
            return (slot.clone(), false);
        }
        let slot = Arc::new(Mutex::new(Slot {
            record: create(),
            evicted: false,
        }));
        slots.insert(entity_id.clone(), slot.clone());
        self.created_total.fetch_add(1, Ordering::Relaxed);
        (slot, true)
    }
}
