//! Outcome labels and the per-cycle quota.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Binary result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    /// Returns true for `Win`.
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    /// Returns the other label.
    pub fn opposite(&self) -> Self {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
        }
    }

    /// Returns the wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Outcome::Win),
            "lose" => Ok(Outcome::Lose),
            other => Err(ValidationError::invalid_format(
                "outcome",
                format!("expected 'win' or 'lose', got '{}'", other),
            )),
        }
    }
}

/// Shape of one cycle: N slots of which exactly W are wins.
///
/// Losses are always derived as `L = N - W`, so the two can never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleQuota {
    length: usize,
    wins: usize,
}

impl CycleQuota {
    /// Creates a quota, rejecting empty cycles and win targets above the length.
    pub fn new(length: usize, wins: usize) -> Result<Self, ValidationError> {
        if length == 0 {
            return Err(ValidationError::out_of_range("cycle_length", 1, i64::MAX, 0));
        }
        if wins > length {
            return Err(ValidationError::out_of_range(
                "target_wins",
                0,
                length as i64,
                wins as i64,
            ));
        }
        Ok(Self { length, wins })
    }

    /// Cycle length N.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Target wins W.
    pub fn wins(&self) -> usize {
        self.wins
    }

    /// Target losses L = N - W.
    pub fn losses(&self) -> usize {
        self.length - self.wins
    }

    /// Target count for a given label.
    pub fn target(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Win => self.wins(),
            Outcome::Lose => self.losses(),
        }
    }
}

impl Default for CycleQuota {
    fn default() -> Self {
        Self { length: 12, wins: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_round_trips_through_str() {
        assert_eq!("win".parse::<Outcome>().unwrap(), Outcome::Win);
        assert_eq!("lose".parse::<Outcome>().unwrap(), Outcome::Lose);
        assert!("draw".parse::<Outcome>().is_err());
    }

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Win).unwrap(), "\"win\"");
        assert_eq!(serde_json::to_string(&Outcome::Lose).unwrap(), "\"lose\"");
    }

    #[test]
    fn opposite_flips_label() {
        assert_eq!(Outcome::Win.opposite(), Outcome::Lose);
        assert_eq!(Outcome::Lose.opposite(), Outcome::Win);
    }

    #[test]
    fn quota_derives_losses() {
        let quota = CycleQuota::new(12, 5).unwrap();
        assert_eq!(quota.losses(), 7);
        assert_eq!(quota.target(Outcome::Win), 5);
        assert_eq!(quota.target(Outcome::Lose), 7);
    }

    #[test]
    fn quota_rejects_zero_length() {
        assert!(CycleQuota::new(0, 0).is_err());
    }

    #[test]
    fn quota_rejects_wins_above_length() {
        assert!(CycleQuota::new(4, 5).is_err());
    }

    #[test]
    fn default_quota_is_twelve_with_five_wins() {
        let quota = CycleQuota::default();
        assert_eq!((quota.length(), quota.wins(), quota.losses()), (12, 5, 7));
    }
}
