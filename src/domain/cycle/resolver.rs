//! Outcome resolution: pattern candidate plus quota safety overrides.
//!
//! The pattern supplies a candidate label for the next slot. Before it is
//! returned, four overrides are evaluated in order (first match wins):
//!
//! | Rule | Condition | Result |
//! |------|-----------|--------|
//! | a | candidate is win, no wins left | lose |
//! | b | candidate is lose, no losses left | win |
//! | c | remaining slots == remaining wins > 0 | win |
//! | d | remaining slots == remaining losses > 0 | lose |
//!
//! With the overrides in place a cycle always closes on exactly W wins,
//! however far the recorded history strayed from the pattern.

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::ports::RandomSource;

use super::record::Remaining;
use super::{pattern, CycleQuota, CycleRecord, Outcome};

/// Which safety rule replaced the pattern's candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    /// Rule a: the pattern wanted a win but the win quota is spent.
    WinQuotaSpent,
    /// Rule b: the pattern wanted a loss but the loss quota is spent.
    LossQuotaSpent,
    /// Rule c: every remaining slot must be a win.
    WinsForced,
    /// Rule d: every remaining slot must be a loss.
    LossesForced,
}

/// The decision for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Label the caller must use for accounting.
    pub outcome: Outcome,
    /// What the pattern held at this slot.
    pub candidate: Outcome,
    /// Rule that changed the candidate, if any.
    pub override_applied: Option<Override>,
    /// True when this call started a new cycle.
    pub rolled_over: bool,
    /// Slot being decided.
    pub position: usize,
}

/// Applies the safety overrides to a candidate label.
///
/// An override is reported only when it changes the label.
pub fn decide(candidate: Outcome, remaining: Remaining) -> (Outcome, Option<Override>) {
    let forced = if candidate.is_win() && remaining.wins <= 0 {
        Some((Outcome::Lose, Override::WinQuotaSpent))
    } else if !candidate.is_win() && remaining.losses <= 0 {
        Some((Outcome::Win, Override::LossQuotaSpent))
    } else if remaining.slots == remaining.wins && remaining.wins > 0 {
        Some((Outcome::Win, Override::WinsForced))
    } else if remaining.slots == remaining.losses && remaining.losses > 0 {
        Some((Outcome::Lose, Override::LossesForced))
    } else {
        None
    };

    match forced {
        Some((outcome, rule)) if outcome != candidate => (outcome, Some(rule)),
        _ => (candidate, None),
    }
}

/// Decides the next label for a validated record.
///
/// A record whose cycle is complete is rolled over to a fresh pattern
/// first. The record is otherwise left unchanged: nothing is consumed
/// until the caller records the realized label.
pub fn resolve(
    record: &mut CycleRecord,
    quota: CycleQuota,
    random: &dyn RandomSource,
    now: Timestamp,
) -> Resolution {
    let rolled_over = record.is_complete(quota);
    if rolled_over {
        record.roll_over(pattern::generate(quota, random), now);
    }

    let remaining = record.remaining(quota);
    let candidate = record.expected_next().unwrap_or(if remaining.wins > 0 {
        Outcome::Win
    } else {
        Outcome::Lose
    });
    let (outcome, override_applied) = decide(candidate, remaining);

    Resolution {
        outcome,
        candidate,
        override_applied,
        rolled_over,
        position: record.position(),
    }
}
