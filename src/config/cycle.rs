//! Cycle shape configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::cycle::CycleQuota;

/// Cycle length N and target wins W; losses are derived as N - W.
#[derive(Debug, Clone, Deserialize)]
pub struct CycleConfig {
    /// Outcomes per cycle
    #[serde(default = "default_length")]
    pub length: usize,

    /// Wins per cycle
    #[serde(default = "default_target_wins")]
    pub target_wins: usize,
}

impl CycleConfig {
    /// Losses per cycle
    pub fn target_losses(&self) -> usize {
        self.length.saturating_sub(self.target_wins)
    }

    /// Builds the domain quota.
    pub fn quota(&self) -> Result<CycleQuota, ValidationError> {
        self.validate()?;
        CycleQuota::new(self.length, self.target_wins).map_err(|_| {
            ValidationError::WinsExceedLength {
                wins: self.target_wins,
                length: self.length,
            }
        })
    }

    /// Validate cycle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.length == 0 {
            return Err(ValidationError::EmptyCycle);
        }
        if self.target_wins > self.length {
            return Err(ValidationError::WinsExceedLength {
                wins: self.target_wins,
                length: self.length,
            });
        }
        Ok(())
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            target_wins: default_target_wins(),
        }
    }
}

fn default_length() -> usize {
    12
}

fn default_target_wins() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_config_defaults() {
        let config = CycleConfig::default();
        assert_eq!(config.length, 12);
        assert_eq!(config.target_wins, 5);
        assert_eq!(config.target_losses(), 7);
    }

    #[test]
    fn test_quota_from_defaults() {
        let quota = CycleConfig::default().quota().unwrap();
        assert_eq!((quota.length(), quota.wins()), (12, 5));
    }

    #[test]
    fn test_validation_zero_length() {
        let config = CycleConfig {
            length: 0,
            target_wins: 0,
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyCycle));
    }

    #[test]
    fn test_validation_wins_above_length() {
        let config = CycleConfig {
            length: 4,
            target_wins: 5,
        };
        assert!(config.quota().is_err());
    }
}
