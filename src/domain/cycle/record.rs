//! Cycle record - per-entity pattern, position and realized history.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

use super::pattern::count_wins;
use super::{CommitError, CycleQuota, Outcome};

/// How often realized outcomes followed the pattern's prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Adherence {
    /// Outcomes recorded over the record's lifetime.
    pub total_resolved: u64,
    /// Recorded outcomes that differed from the pattern slot.
    pub deviations: u64,
}

impl Adherence {
    /// Fraction of recorded outcomes that matched the pattern (1.0 when empty).
    pub fn adherence_rate(&self) -> f64 {
        if self.total_resolved == 0 {
            return 1.0;
        }
        1.0 - (self.deviations as f64 / self.total_resolved as f64)
    }
}

/// Signed quota left in the current cycle.
///
/// Values go negative only for corrupted records, which the validator
/// catches before anything is decided from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub wins: i64,
    pub losses: i64,
    pub slots: i64,
}

/// Result of appending one realized outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Slot index the outcome was written to.
    pub slot: usize,
    /// What the pattern held at that slot.
    pub expected: Option<Outcome>,
    /// What the caller recorded.
    pub realized: Outcome,
    /// True when `realized` differs from `expected`.
    pub deviation: bool,
}

/// Totals of a cycle that reached its last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    /// 1-based count of cycles this record has finished.
    pub cycle_number: u64,
    pub wins: usize,
    pub losses: usize,
    /// Slots in this cycle where the history left the pattern.
    pub deviations: usize,
    /// True when wins and losses equal the quota exactly.
    pub ratio_held: bool,
}

/// Read-only diagnostic view of one entity's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleState {
    pub played: usize,
    pub wins: usize,
    pub losses: usize,
    pub remaining_wins: usize,
    pub remaining_losses: usize,
    pub complete: bool,
    pub deviations: u64,
}

/// Per-entity cycle state, owned exclusively by the cycle store.
///
/// `position` and `history` only ever move together: every write goes
/// through [`CycleRecord::append`] or replaces the cycle wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pattern: Vec<Outcome>,
    position: usize,
    history: Vec<Outcome>,
    created_at: Timestamp,
    last_activity_at: Timestamp,
    adherence: Adherence,
    cycles_completed: u64,
}

impl CycleRecord {
    /// Creates a fresh record at the start of a cycle.
    pub fn new(pattern: Vec<Outcome>, now: Timestamp) -> Self {
        let capacity = pattern.len();
        Self {
            pattern,
            position: 0,
            history: Vec::with_capacity(capacity),
            created_at: now,
            last_activity_at: now,
            adherence: Adherence::default(),
            cycles_completed: 0,
        }
    }

    /// Rebuilds a record from raw parts without checking invariants.
    ///
    /// Used when restoring state from elsewhere; the validator decides
    /// whether the result is usable.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        pattern: Vec<Outcome>,
        position: usize,
        history: Vec<Outcome>,
        created_at: Timestamp,
        last_activity_at: Timestamp,
        adherence: Adherence,
        cycles_completed: u64,
    ) -> Self {
        Self {
            pattern,
            position,
            history,
            created_at,
            last_activity_at,
            adherence,
            cycles_completed,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn pattern(&self) -> &[Outcome] {
        &self.pattern
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn history(&self) -> &[Outcome] {
        &self.history
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn adherence(&self) -> Adherence {
        self.adherence
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Wins realized so far this cycle.
    pub fn wins_so_far(&self) -> usize {
        count_wins(&self.history)
    }

    /// Losses realized so far this cycle.
    pub fn losses_so_far(&self) -> usize {
        self.history.len() - self.wins_so_far()
    }

    /// Quota left for the rest of the cycle.
    pub fn remaining(&self, quota: CycleQuota) -> Remaining {
        Remaining {
            wins: quota.wins() as i64 - self.wins_so_far() as i64,
            losses: quota.losses() as i64 - self.losses_so_far() as i64,
            slots: quota.length() as i64 - self.position as i64,
        }
    }

    /// True once every slot of the cycle has been recorded.
    pub fn is_complete(&self, quota: CycleQuota) -> bool {
        self.position >= quota.length()
    }

    /// Pattern label at the next unconsumed slot.
    pub fn expected_next(&self) -> Option<Outcome> {
        self.pattern.get(self.position).copied()
    }

    /// Slots in the current cycle where history differs from the pattern.
    pub fn cycle_deviations(&self) -> usize {
        self.history
            .iter()
            .enumerate()
            .filter(|(i, realized)| self.pattern.get(*i) != Some(*realized))
            .count()
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Refreshes the activity timestamp used by eviction.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity_at = now;
    }

    /// Starts the next cycle with a new pattern, keeping lifetime counters.
    pub fn roll_over(&mut self, pattern: Vec<Outcome>, now: Timestamp) {
        self.pattern = pattern;
        self.position = 0;
        self.history.clear();
        self.last_activity_at = now;
    }

    /// Records a realized outcome in the next slot.
    ///
    /// Advances `position` and `history` together and updates adherence.
    /// Refuses to write past the end of the cycle.
    pub fn append(
        &mut self,
        realized: Outcome,
        quota: CycleQuota,
        now: Timestamp,
    ) -> Result<AppendOutcome, CommitError> {
        if self.position >= quota.length() {
            return Err(CommitError::CycleExhausted {
                position: self.position,
                cycle_length: quota.length(),
            });
        }

        let slot = self.position;
        let expected = self.expected_next();
        self.history.push(realized);
        self.position += 1;
        self.last_activity_at = now;

        let deviation = expected != Some(realized);
        self.adherence.total_resolved += 1;
        if deviation {
            self.adherence.deviations += 1;
        }
        if self.position == quota.length() {
            self.cycles_completed += 1;
        }

        Ok(AppendOutcome {
            slot,
            expected,
            realized,
            deviation,
        })
    }

    /// Totals for a finished cycle, `None` while slots remain.
    pub fn summary(&self, quota: CycleQuota) -> Option<CycleSummary> {
        if !self.is_complete(quota) {
            return None;
        }
        let wins = self.wins_so_far();
        let losses = self.losses_so_far();
        Some(CycleSummary {
            cycle_number: self.cycles_completed,
            wins,
            losses,
            deviations: self.cycle_deviations(),
            ratio_held: wins == quota.wins() && losses == quota.losses(),
        })
    }

    /// Diagnostic snapshot.
    pub fn snapshot(&self, quota: CycleQuota) -> CycleState {
        let wins = self.wins_so_far();
        let losses = self.losses_so_far();
        CycleState {
            played: self.position,
            wins,
            losses,
            remaining_wins: quota.wins().saturating_sub(wins),
            remaining_losses: quota.losses().saturating_sub(losses),
            complete: self.is_complete(quota),
            deviations: self.adherence.deviations,
        }
    }

    #[cfg(test)]
    pub(crate) fn history_mut(&mut self) -> &mut Vec<Outcome> {
        &mut self.history
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::pattern::fallback_pattern;

    fn quota() -> CycleQuota {
        CycleQuota::new(4, 2).unwrap()
    }

    fn fresh() -> CycleRecord {
        CycleRecord::new(fallback_pattern(quota()), Timestamp::from_unix_millis(0))
    }

    #[test]
    fn new_record_starts_empty() {
        let record = fresh();
        assert_eq!(record.position(), 0);
        assert!(record.history().is_empty());
        assert_eq!(record.created_at(), record.last_activity_at());
        assert_eq!(record.expected_next(), Some(Outcome::Win));
    }

    #[test]
    fn append_advances_position_and_history_together() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);

        let appended = record.append(Outcome::Win, quota(), now).unwrap();

        assert_eq!(appended.slot, 0);
        assert!(!appended.deviation);
        assert_eq!(record.position(), 1);
        assert_eq!(record.history(), &[Outcome::Win]);
        assert_eq!(record.last_activity_at(), now);
    }

    #[test]
    fn append_counts_deviations() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);

        let appended = record.append(Outcome::Lose, quota(), now).unwrap();

        assert!(appended.deviation);
        assert_eq!(appended.expected, Some(Outcome::Win));
        assert_eq!(record.adherence().deviations, 1);
        assert_eq!(record.adherence().total_resolved, 1);
        assert_eq!(record.cycle_deviations(), 1);
    }

    #[test]
    fn append_refuses_to_overrun() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);
        for outcome in fallback_pattern(quota()) {
            record.append(outcome, quota(), now).unwrap();
        }
        let before = record.clone();

        let err = record.append(Outcome::Win, quota(), now).unwrap_err();

        assert_eq!(
            err,
            CommitError::CycleExhausted {
                position: 4,
                cycle_length: 4
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn completing_cycle_produces_summary() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);
        assert!(record.summary(quota()).is_none());

        for outcome in fallback_pattern(quota()) {
            record.append(outcome, quota(), now).unwrap();
        }

        let summary = record.summary(quota()).unwrap();
        assert_eq!(summary.cycle_number, 1);
        assert_eq!((summary.wins, summary.losses), (2, 2));
        assert!(summary.ratio_held);
        assert_eq!(record.cycles_completed(), 1);
    }

    #[test]
    fn roll_over_clears_cycle_but_keeps_lifetime_counters() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);
        record.append(Outcome::Lose, quota(), now).unwrap();

        record.roll_over(fallback_pattern(quota()), Timestamp::from_unix_millis(2_000));

        assert_eq!(record.position(), 0);
        assert!(record.history().is_empty());
        assert_eq!(record.adherence().deviations, 1);
        assert_eq!(record.created_at(), Timestamp::from_unix_millis(0));
    }

    #[test]
    fn snapshot_reports_remaining_quota() {
        let mut record = fresh();
        let now = Timestamp::from_unix_millis(1_000);
        record.append(Outcome::Win, quota(), now).unwrap();

        let state = record.snapshot(quota());

        assert_eq!(state.played, 1);
        assert_eq!((state.wins, state.losses), (1, 0));
        assert_eq!((state.remaining_wins, state.remaining_losses), (1, 2));
        assert!(!state.complete);
    }

    #[test]
    fn remaining_goes_negative_for_overfilled_history() {
        let mut record = fresh();
        record.history_mut().extend([Outcome::Win; 3]);
        record.set_position(3);

        let remaining = record.remaining(quota());
        assert_eq!(remaining.wins, -1);
    }

    #[test]
    fn adherence_rate_handles_empty_and_partial() {
        assert_eq!(Adherence::default().adherence_rate(), 1.0);
        let adherence = Adherence {
            total_resolved: 4,
            deviations: 1,
        };
        assert!((adherence.adherence_rate() - 0.75).abs() < f64::EPSILON);
    }
}
