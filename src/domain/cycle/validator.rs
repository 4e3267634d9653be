//! Structural checks on cycle records, with reset-on-failure repair.
//!
//! A record that fails any check is discarded and replaced by a fresh
//! cycle. Nothing downstream ever decides an outcome from a record that
//! has not just passed [`validate`].

use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::ports::RandomSource;

use super::pattern::{self, count_wins};
use super::{CycleQuota, CycleRecord};

/// A violated structural invariant of a cycle record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("Realized wins {wins} exceed target {target}")]
    TooManyWins { wins: usize, target: usize },

    #[error("Realized losses {losses} exceed target {target}")]
    TooManyLosses { losses: usize, target: usize },

    #[error("History length {len} exceeds cycle length {cycle_length}")]
    HistoryOverflow { len: usize, cycle_length: usize },

    #[error("Position {position} does not match history length {history_len}")]
    PositionMismatch { position: usize, history_len: usize },

    #[error("Pattern length {len} does not match cycle length {cycle_length}")]
    PatternLength { len: usize, cycle_length: usize },

    #[error("Pattern holds {wins} wins, expected {target}")]
    PatternComposition { wins: usize, target: usize },
}

impl Corruption {
    /// Stable snake_case name, used as a log and event field.
    pub fn kind(&self) -> &'static str {
        match self {
            Corruption::TooManyWins { .. } => "too_many_wins",
            Corruption::TooManyLosses { .. } => "too_many_losses",
            Corruption::HistoryOverflow { .. } => "history_overflow",
            Corruption::PositionMismatch { .. } => "position_mismatch",
            Corruption::PatternLength { .. } => "pattern_length",
            Corruption::PatternComposition { .. } => "pattern_composition",
        }
    }
}

/// Checks every structural invariant, reporting the first violation.
pub fn validate(record: &CycleRecord, quota: CycleQuota) -> Result<(), Corruption> {
    let wins = record.wins_so_far();
    if wins > quota.wins() {
        return Err(Corruption::TooManyWins {
            wins,
            target: quota.wins(),
        });
    }

    let losses = record.losses_so_far();
    if losses > quota.losses() {
        return Err(Corruption::TooManyLosses {
            losses,
            target: quota.losses(),
        });
    }

    let len = record.history().len();
    if len > quota.length() {
        return Err(Corruption::HistoryOverflow {
            len,
            cycle_length: quota.length(),
        });
    }

    if record.position() != len {
        return Err(Corruption::PositionMismatch {
            position: record.position(),
            history_len: len,
        });
    }

    let pattern_len = record.pattern().len();
    if pattern_len != quota.length() {
        return Err(Corruption::PatternLength {
            len: pattern_len,
            cycle_length: quota.length(),
        });
    }

    let pattern_wins = count_wins(record.pattern());
    if pattern_wins != quota.wins() {
        return Err(Corruption::PatternComposition {
            wins: pattern_wins,
            target: quota.wins(),
        });
    }

    Ok(())
}

/// Validates the record and, on any failure, replaces it with a fresh cycle.
///
/// Returns the violation that forced the reset, or `None` when the record
/// was valid and left untouched.
pub fn check_and_repair(
    record: &mut CycleRecord,
    quota: CycleQuota,
    random: &dyn RandomSource,
    now: Timestamp,
) -> Option<Corruption> {
    let corruption = validate(record, quota).err()?;
    *record = CycleRecord::new(pattern::generate(quota, random), now);
    Some(corruption)
}
