//! Eviction policy - decides which records a sweep removes.
//!
//! The policy is pure: it receives a snapshot of activity times and
//! returns victims. Removing them is the store's job.
//!
//! Two triggers apply, in order:
//!
//! 1. **Idle**: any record whose last activity is older than the idle
//!    threshold.
//! 2. **Capacity**: if the count left after the idle pass is still above
//!    the cap, the least recently active records until it is not.

use chrono::Duration;
use serde::Serialize;

use crate::config::EvictionConfig;
use crate::domain::foundation::{EntityId, Timestamp};

/// One evictable record as seen by the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub entity_id: EntityId,
    pub last_activity_at: Timestamp,
}

/// Records selected for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub idle: Vec<EntityId>,
    pub capacity: Vec<EntityId>,
}

impl EvictionPlan {
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty() && self.capacity.is_empty()
    }

    pub fn len(&self) -> usize {
        self.idle.len() + self.capacity.len()
    }
}

/// What a sweep removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub swept_at: Timestamp,
    pub idle_evicted: Vec<EntityId>,
    pub capacity_evicted: Vec<EntityId>,
    /// Records in use by a caller during the sweep, left in place.
    pub skipped_busy: usize,
    /// Tracked count after the sweep.
    pub remaining: usize,
}

impl SweepReport {
    pub fn evicted(&self) -> usize {
        self.idle_evicted.len() + self.capacity_evicted.len()
    }
}

// chrono panics on second counts near i64::MAX; a century is plenty.
const MAX_IDLE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Idle threshold, sweep cadence and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    idle_threshold: Duration,
    sweep_interval: std::time::Duration,
    max_tracked: usize,
}

impl EvictionPolicy {
    pub fn new(
        idle_threshold: Duration,
        sweep_interval: std::time::Duration,
        max_tracked: usize,
    ) -> Self {
        Self {
            idle_threshold,
            sweep_interval,
            max_tracked,
        }
    }

    pub fn from_config(config: &EvictionConfig) -> Self {
        Self::new(
            Duration::seconds(config.idle_threshold_secs.min(MAX_IDLE_SECS) as i64),
            config.sweep_interval(),
            config.max_tracked_entities,
        )
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        self.sweep_interval
    }

    pub fn max_tracked(&self) -> usize {
        self.max_tracked
    }

    /// Returns true when a record last active at `last_activity_at` is idle.
    pub fn is_idle(&self, last_activity_at: Timestamp, now: Timestamp) -> bool {
        now.duration_since(&last_activity_at) > self.idle_threshold
    }

    /// Selects victims from `candidates`.
    ///
    /// `tracked` is the full record count, including records that are not
    /// candidates because a caller holds them. Those still count toward
    /// the cap but cannot be chosen, so the plan may leave the store above
    /// the cap until the next sweep.
    pub fn plan(&self, candidates: &[ActivityEntry], tracked: usize, now: Timestamp) -> EvictionPlan {
        let (idle, mut active): (Vec<&ActivityEntry>, Vec<&ActivityEntry>) = candidates
            .iter()
            .partition(|entry| self.is_idle(entry.last_activity_at, now));

        let after_idle = tracked.saturating_sub(idle.len());
        let excess = after_idle.saturating_sub(self.max_tracked);

        active.sort_by(|a, b| {
            a.last_activity_at
                .cmp(&b.last_activity_at)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        EvictionPlan {
            idle: idle.into_iter().map(|e| e.entity_id.clone()).collect(),
            capacity: active
                .into_iter()
                .take(excess)
                .map(|e| e.entity_id.clone())
                .collect(),
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::from_config(&EvictionConfig::default())
    }
}
