//! OutcomeEngine - the caller-facing outcome-cycle service.
//!
//! Every operation follows the same shape: find (or lazily create) the
//! entity's record, lock it, repair it if it fails validation, do the
//! work, unlock, then emit the events collected along the way. Events
//! never leave while a record lock is held.

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::clock::SystemClock;
use crate::adapters::events::TracingEventSink;
use crate::adapters::random::ThreadRandom;
use crate::config::{AppConfig, ValidationError};
use crate::domain::cycle::{
    pattern, resolver, validator, CommitError, Corruption, CycleEvent, CycleEventKind, CycleQuota,
    CycleRecord, CycleState, CycleSummary, Outcome, ResetReason,
};
use crate::domain::foundation::{EntityId, Timestamp};
use crate::ports::{Clock, CycleEventSink, RandomSource};

use super::cycle_store::CycleStore;
use super::eviction::{EvictionPolicy, SweepReport};

/// Acknowledgement of a committed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    /// Record position after the commit.
    pub position: usize,
    /// True when the committed label differed from the pattern slot.
    pub deviation: bool,
    /// Set when this commit filled the last slot of the cycle.
    pub completed: Option<CycleSummary>,
    /// True when the post-write check failed and the record was recreated.
    pub was_reset: bool,
}

/// Operational snapshot of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub tracked_entities: usize,
    pub last_sweep_at: Option<Timestamp>,
    pub capacity: usize,
    pub cycle_length: usize,
    pub target_wins: usize,
    pub created_total: u64,
    pub evicted_total: u64,
}

/// Per-entity outcome-cycle engine.
///
/// Instances are independent: each owns its store, so tests and shards
/// can run side by side without shared state.
pub struct OutcomeEngine {
    quota: CycleQuota,
    policy: EvictionPolicy,
    store: CycleStore,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn CycleEventSink>,
}

impl OutcomeEngine {
    /// Creates an engine with thread-local randomness, the system clock
    /// and structured-log events.
    pub fn new(quota: CycleQuota, policy: EvictionPolicy) -> Self {
        Self {
            quota,
            policy,
            store: CycleStore::new(),
            random: Arc::new(ThreadRandom::new()),
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingEventSink::new()),
        }
    }

    /// Builds an engine from validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ValidationError> {
        config.eviction.validate()?;
        let quota = config.cycle.quota()?;
        Ok(Self::new(quota, EvictionPolicy::from_config(&config.eviction)))
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn CycleEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn quota(&self) -> CycleQuota {
        self.quota
    }

    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    /// Decides the label for the entity's next round.
    ///
    /// Nothing is consumed: calling again before a commit returns the same
    /// label. A finished cycle rolls over to a fresh pattern here.
    pub fn next_outcome(&self, entity_id: &EntityId) -> Outcome {
        let now = self.clock.now();
        let mut events = Vec::new();

        let resolution = self.store.get_or_create(
            entity_id,
            || self.fresh_record(now),
            |record, created| {
                if created {
                    events.push(self.created_event(entity_id, now));
                }
                self.repair(entity_id, record, now, &mut events);

                let resolution = resolver::resolve(record, self.quota, self.random.as_ref(), now);
                if resolution.rolled_over {
                    events.push(CycleEvent::new(
                        entity_id.clone(),
                        now,
                        CycleEventKind::CycleReset {
                            reason: ResetReason::Rollover,
                        },
                    ));
                }
                record.touch(now);
                resolution
            },
        );

        if let Some(rule) = resolution.override_applied {
            tracing::debug!(
                entity_id = %entity_id,
                position = resolution.position,
                candidate = %resolution.candidate,
                outcome = %resolution.outcome,
                rule = ?rule,
                "Pattern candidate overridden"
            );
        }

        self.events.emit_all(&events);
        resolution.outcome
    }

    /// Records the label the caller actually used for the entity's round.
    ///
    /// # Errors
    ///
    /// Returns `CycleExhausted` when the cycle is already full. The record
    /// is left unchanged; call [`next_outcome`](Self::next_outcome) to
    /// start the next cycle.
    pub fn commit_outcome(
        &self,
        entity_id: &EntityId,
        realized: Outcome,
    ) -> Result<CommitReceipt, CommitError> {
        let now = self.clock.now();
        let mut events = Vec::new();

        let result = self.store.get_or_create(
            entity_id,
            || self.fresh_record(now),
            |record, created| -> Result<CommitReceipt, CommitError> {
                if created {
                    events.push(self.created_event(entity_id, now));
                }
                self.repair(entity_id, record, now, &mut events);

                let appended = record.append(realized, self.quota, now)?;
                if appended.deviation {
                    tracing::debug!(
                        entity_id = %entity_id,
                        slot = appended.slot,
                        expected = ?appended.expected,
                        realized = %realized,
                        "Committed outcome deviates from pattern"
                    );
                    events.push(CycleEvent::new(
                        entity_id.clone(),
                        now,
                        CycleEventKind::DeviationRecorded {
                            slot: appended.slot,
                            expected: appended.expected,
                            realized,
                        },
                    ));
                }

                let was_reset = self.repair(entity_id, record, now, &mut events);
                let completed = if was_reset {
                    None
                } else {
                    record.summary(self.quota)
                };

                if let Some(summary) = completed {
                    if !summary.ratio_held {
                        tracing::error!(
                            entity_id = %entity_id,
                            cycle_number = summary.cycle_number,
                            wins = summary.wins,
                            losses = summary.losses,
                            target_wins = self.quota.wins(),
                            target_losses = self.quota.losses(),
                            "Completed cycle broke the win ratio"
                        );
                    }
                    events.push(CycleEvent::new(
                        entity_id.clone(),
                        now,
                        CycleEventKind::CycleCompleted {
                            cycle_number: summary.cycle_number,
                            wins: summary.wins,
                            losses: summary.losses,
                            deviations: summary.deviations,
                            ratio_held: summary.ratio_held,
                        },
                    ));
                }

                Ok(CommitReceipt {
                    position: record.position(),
                    deviation: appended.deviation,
                    completed,
                    was_reset,
                })
            },
        );

        if let Err(err) = &result {
            tracing::warn!(entity_id = %entity_id, error = %err, "Commit refused");
        }

        self.events.emit_all(&events);
        result
    }

    /// Read-only diagnostic view of the entity's cycle.
    ///
    /// Untracked entities report a fresh cycle without being tracked. A
    /// tracked record is repaired first if it fails validation. Activity
    /// time is not refreshed.
    pub fn get_state(&self, entity_id: &EntityId) -> CycleState {
        let now = self.clock.now();
        let mut events = Vec::new();

        let state = self.store.peek(entity_id, |record| {
            self.repair(entity_id, record, now, &mut events);
            record.snapshot(self.quota)
        });

        self.events.emit_all(&events);
        state.unwrap_or_else(|| {
            CycleRecord::new(pattern::fallback_pattern(self.quota), now).snapshot(self.quota)
        })
    }

    /// Copy of the entity's record as currently stored, without repair.
    pub fn export_record(&self, entity_id: &EntityId) -> Option<CycleRecord> {
        self.store.peek(entity_id, |record| record.clone())
    }

    /// Tracks a record restored from elsewhere, replacing the current one.
    ///
    /// The record is validated (and repaired) by the next operation on
    /// the entity.
    pub fn restore_record(&self, entity_id: EntityId, record: CycleRecord) {
        tracing::debug!(entity_id = %entity_id, position = record.position(), "Record restored");
        self.store.insert(entity_id, record);
    }

    /// Forgets the entity. Its next round starts a fresh cycle.
    pub fn reset_entity(&self, entity_id: &EntityId) -> bool {
        let removed = self.store.reset(entity_id);
        if removed {
            tracing::warn!(entity_id = %entity_id, "Entity reset by operator");
            self.events.emit(&CycleEvent::new(
                entity_id.clone(),
                self.clock.now(),
                CycleEventKind::CycleReset {
                    reason: ResetReason::Administrative,
                },
            ));
        }
        removed
    }

    /// Forgets every entity, returning how many were tracked.
    pub fn reset_all(&self) -> usize {
        let cleared = self.store.reset_all();
        let now = self.clock.now();
        tracing::warn!(cleared = cleared.len(), "All entities reset by operator");

        let events: Vec<CycleEvent> = cleared
            .iter()
            .map(|entity_id| {
                CycleEvent::new(
                    entity_id.clone(),
                    now,
                    CycleEventKind::CycleReset {
                        reason: ResetReason::Administrative,
                    },
                )
            })
            .collect();
        self.events.emit_all(&events);
        cleared.len()
    }

    pub fn system_stats(&self) -> EngineStats {
        let store = self.store.stats();
        EngineStats {
            tracked_entities: store.tracked,
            last_sweep_at: store.last_sweep_at,
            capacity: self.policy.max_tracked(),
            cycle_length: self.quota.length(),
            target_wins: self.quota.wins(),
            created_total: store.created_total,
            evicted_total: store.evicted_total,
        }
    }

    /// Runs the idle and capacity sweeps immediately.
    pub fn sweep_now(&self) -> SweepReport {
        let report = self.store.sweep(&self.policy, self.clock.now());
        tracing::info!(
            idle_evicted = report.idle_evicted.len(),
            capacity_evicted = report.capacity_evicted.len(),
            skipped_busy = report.skipped_busy,
            remaining = report.remaining,
            capacity = self.policy.max_tracked(),
            "Eviction sweep finished"
        );
        if report.remaining > self.policy.max_tracked() {
            tracing::warn!(
                remaining = report.remaining,
                capacity = self.policy.max_tracked(),
                "Store still above capacity after sweep"
            );
        }
        report
    }

    fn fresh_record(&self, now: Timestamp) -> CycleRecord {
        CycleRecord::new(pattern::generate(self.quota, self.random.as_ref()), now)
    }

    fn created_event(&self, entity_id: &EntityId, now: Timestamp) -> CycleEvent {
        CycleEvent::new(
            entity_id.clone(),
            now,
            CycleEventKind::CycleCreated {
                cycle_length: self.quota.length(),
                target_wins: self.quota.wins(),
            },
        )
    }

    // Returns true when the record was recreated.
    fn repair(
        &self,
        entity_id: &EntityId,
        record: &mut CycleRecord,
        now: Timestamp,
        events: &mut Vec<CycleEvent>,
    ) -> bool {
        let Some(corruption) =
            validator::check_and_repair(record, self.quota, self.random.as_ref(), now)
        else {
            return false;
        };

        self.report_corruption(entity_id, &corruption);
        events.push(CycleEvent::new(
            entity_id.clone(),
            now,
            CycleEventKind::CorruptionDetected {
                corruption: corruption.kind().to_string(),
                detail: corruption.to_string(),
            },
        ));
        events.push(CycleEvent::new(
            entity_id.clone(),
            now,
            CycleEventKind::CycleReset {
                reason: ResetReason::Corruption,
            },
        ));
        true
    }

    fn report_corruption(&self, entity_id: &EntityId, corruption: &Corruption) {
        tracing::error!(
            entity_id = %entity_id,
            corruption = corruption.kind(),
            detail = %corruption,
            "Cycle record failed validation"
        );
        tracing::warn!(entity_id = %entity_id, "Cycle record reset to a fresh cycle");
    }
}

impl std::fmt::Debug for OutcomeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeEngine")
            .field("quota", &self.quota)
            .field("policy", &self.policy)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::events::InMemoryEventSink;
    use crate::adapters::random::ScriptedRandom;
    use crate::domain::cycle::Adherence;
    use chrono::Duration;

    struct Fixture {
        engine: OutcomeEngine,
        clock: Arc<ManualClock>,
        events: Arc<InMemoryEventSink>,
    }

    fn fixture(length: usize, wins: usize, capacity: usize) -> Fixture {
        let clock = Arc::new(ManualClock::at_epoch());
        let events = Arc::new(InMemoryEventSink::new());
        let policy = EvictionPolicy::new(
            Duration::seconds(60),
            std::time::Duration::from_secs(10),
            capacity,
        );
        let engine = OutcomeEngine::new(CycleQuota::new(length, wins).unwrap(), policy)
            .with_clock(clock.clone())
            .with_event_sink(events.clone());
        Fixture {
            engine,
            clock,
            events,
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn play(engine: &OutcomeEngine, entity: &EntityId) -> (Outcome, CommitReceipt) {
        let outcome = engine.next_outcome(entity);
        let receipt = engine.commit_outcome(entity, outcome).unwrap();
        (outcome, receipt)
    }

    #[test]
    fn first_request_creates_record_and_emits_event() {
        let f = fixture(12, 5, 100);

        f.engine.next_outcome(&id("a"));

        assert_eq!(f.engine.system_stats().tracked_entities, 1);
        assert_eq!(f.events.events_of_type("cycle_created").len(), 1);
    }

    #[test]
    fn next_outcome_is_stable_until_commit() {
        let f = fixture(12, 5, 100);
        let first = f.engine.next_outcome(&id("a"));
        let again = f.engine.next_outcome(&id("a"));
        assert_eq!(first, again);
        assert_eq!(f.engine.get_state(&id("a")).played, 0);
    }

    #[test]
    fn full_cycle_hits_exact_ratio_and_completes() {
        let f = fixture(12, 5, 100);
        let entity = id("a");

        let mut wins = 0;
        let mut last = None;
        for _ in 0..12 {
            let (outcome, receipt) = play(&f.engine, &entity);
            wins += usize::from(outcome.is_win());
            last = Some(receipt);
        }

        let receipt = last.unwrap();
        assert_eq!(wins, 5);
        assert_eq!(receipt.position, 12);
        let summary = receipt.completed.unwrap();
        assert!(summary.ratio_held);
        assert_eq!(summary.cycle_number, 1);
        assert_eq!(f.events.events_of_type("cycle_completed").len(), 1);
        assert!(f.engine.get_state(&entity).complete);
    }

    #[test]
    fn commit_past_cycle_end_is_refused_without_change() {
        let f = fixture(4, 2, 100);
        let entity = id("a");
        for _ in 0..4 {
            play(&f.engine, &entity);
        }
        let before = f.engine.export_record(&entity).unwrap();

        let err = f.engine.commit_outcome(&entity, Outcome::Win).unwrap_err();

        assert_eq!(
            err,
            CommitError::CycleExhausted {
                position: 4,
                cycle_length: 4
            }
        );
        assert_eq!(f.engine.export_record(&entity).unwrap(), before);
    }

    #[test]
    fn next_after_complete_rolls_over() {
        let f = fixture(4, 2, 100);
        let entity = id("a");
        for _ in 0..4 {
            play(&f.engine, &entity);
        }

        f.engine.next_outcome(&entity);

        let state = f.engine.get_state(&entity);
        assert_eq!(state.played, 0);
        assert_eq!((state.remaining_wins, state.remaining_losses), (2, 2));
        assert_eq!(f.events.events_of_type("cycle_reset").len(), 1);
    }

    #[test]
    fn deviating_commit_is_recorded() {
        // Scripted draws of identity keep the fallback order: W W L L.
        let f = fixture(4, 2, 100);
        let engine = f
            .engine
            .with_random(Arc::new(ScriptedRandom::new(vec![3, 2, 1])));
        let entity = id("a");

        assert_eq!(engine.next_outcome(&entity), Outcome::Win);
        let receipt = engine.commit_outcome(&entity, Outcome::Lose).unwrap();

        assert!(receipt.deviation);
        assert_eq!(engine.get_state(&entity).deviations, 1);
        let deviations = f.events.events_of_type("deviation_recorded");
        assert_eq!(deviations.len(), 1);
    }

    #[test]
    fn overrides_keep_ratio_after_deviations() {
        let f = fixture(4, 2, 100);
        let engine = f
            .engine
            .with_random(Arc::new(ScriptedRandom::new(vec![3, 2, 1])));
        let entity = id("a");

        // Pattern is W W L L; commit L L against it.
        engine.next_outcome(&entity);
        engine.commit_outcome(&entity, Outcome::Lose).unwrap();
        engine.next_outcome(&entity);
        engine.commit_outcome(&entity, Outcome::Lose).unwrap();

        // Losses are spent: the remaining two must be wins.
        let (third, _) = play(&engine, &entity);
        let (fourth, receipt) = play(&engine, &entity);

        assert_eq!((third, fourth), (Outcome::Win, Outcome::Win));
        assert!(receipt.completed.unwrap().ratio_held);
    }

    #[test]
    fn corrupted_record_is_reset_before_next_outcome() {
        let f = fixture(12, 5, 100);
        let entity = id("a");
        let corrupt = CycleRecord::reconstitute(
            pattern::fallback_pattern(f.engine.quota()),
            6,
            vec![Outcome::Win; 6],
            Timestamp::from_unix_millis(0),
            Timestamp::from_unix_millis(0),
            Adherence::default(),
            0,
        );
        f.engine.restore_record(entity.clone(), corrupt);

        f.engine.next_outcome(&entity);

        let state = f.engine.get_state(&entity);
        assert_eq!(state.played, 0);
        assert_eq!(state.remaining_wins, 5);
        assert_eq!(f.events.events_of_type("corruption_detected").len(), 1);
        let resets = f.events.events_of_type("cycle_reset");
        assert_eq!(resets.len(), 1);
        assert_eq!(
            resets[0].kind,
            CycleEventKind::CycleReset {
                reason: ResetReason::Corruption
            }
        );
    }

    #[test]
    fn commit_that_breaks_quota_resets_record() {
        // A commit that overshoots the win target is accepted by append and
        // caught by the post-write check.
        let f = fixture(4, 2, 100);
        let entity = id("a");
        f.engine.next_outcome(&entity);
        f.engine.commit_outcome(&entity, Outcome::Win).unwrap();
        f.engine.commit_outcome(&entity, Outcome::Win).unwrap();

        let receipt = f.engine.commit_outcome(&entity, Outcome::Win).unwrap();

        assert!(receipt.was_reset);
        assert_eq!(receipt.position, 0);
        assert!(receipt.completed.is_none());
        assert_eq!(f.engine.get_state(&entity).played, 0);
    }

    #[test]
    fn get_state_for_unknown_entity_does_not_track_it() {
        let f = fixture(12, 5, 100);

        let state = f.engine.get_state(&id("ghost"));

        assert_eq!(state.played, 0);
        assert_eq!((state.remaining_wins, state.remaining_losses), (5, 7));
        assert!(!state.complete);
        assert_eq!(f.engine.system_stats().tracked_entities, 0);
    }

    #[test]
    fn get_state_does_not_refresh_activity() {
        let f = fixture(12, 5, 100);
        let entity = id("a");
        f.engine.next_outcome(&entity);

        f.clock.advance_secs(120);
        f.engine.get_state(&entity);
        let report = f.engine.sweep_now();

        assert_eq!(report.idle_evicted, vec![entity]);
    }

    #[test]
    fn reset_entity_emits_administrative_reset() {
        let f = fixture(12, 5, 100);
        let entity = id("a");
        play(&f.engine, &entity);

        assert!(f.engine.reset_entity(&entity));
        assert!(!f.engine.reset_entity(&entity));

        assert_eq!(f.engine.system_stats().tracked_entities, 0);
        assert_eq!(f.events.events_of_type("cycle_reset").len(), 1);
    }

    #[test]
    fn reset_all_clears_everything() {
        let f = fixture(12, 5, 100);
        for name in ["a", "b", "c"] {
            f.engine.next_outcome(&id(name));
        }

        assert_eq!(f.engine.reset_all(), 3);

        assert_eq!(f.engine.system_stats().tracked_entities, 0);
        assert_eq!(f.events.events_of_type("cycle_reset").len(), 3);
    }

    #[test]
    fn sweep_enforces_capacity_by_activity() {
        let f = fixture(12, 5, 2);
        for name in ["a", "b", "c", "d"] {
            f.engine.next_outcome(&id(name));
            f.clock.advance_secs(1);
        }

        let report = f.engine.sweep_now();

        assert_eq!(report.capacity_evicted, vec![id("a"), id("b")]);
        let stats = f.engine.system_stats();
        assert_eq!(stats.tracked_entities, 2);
        assert_eq!(stats.capacity, 2);
        assert_eq!(stats.last_sweep_at, Some(f.clock.now()));
        assert_eq!(stats.evicted_total, 2);
    }

    #[test]
    fn evicted_entity_comes_back_fresh() {
        let f = fixture(12, 5, 100);
        let entity = id("a");
        play(&f.engine, &entity);
        f.clock.advance_secs(61);
        f.engine.sweep_now();

        f.engine.next_outcome(&entity);

        assert_eq!(f.engine.get_state(&entity).played, 0);
        assert_eq!(f.events.events_of_type("cycle_created").len(), 2);
    }

    #[test]
    fn from_config_rejects_invalid_quota() {
        let mut config = AppConfig::default();
        config.cycle.target_wins = 20;
        assert!(OutcomeEngine::from_config(&config).is_err());
        assert!(OutcomeEngine::from_config(&AppConfig::default()).is_ok());
    }
}
