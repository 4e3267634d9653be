//! Play round configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Bet bounds and presentation settings for play rounds.
///
/// Amounts are minor currency units (cents).
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_min_bet")]
    pub min_bet: i64,

    #[serde(default = "default_max_bet")]
    pub max_bet: i64,

    /// Probability that the coin shown disagrees with the accounting outcome
    #[serde(default)]
    pub presentation_mismatch_rate: f64,
}

impl GameConfig {
    /// Returns true when `amount` is within the bet bounds.
    pub fn accepts_bet(&self, amount: i64) -> bool {
        (self.min_bet..=self.max_bet).contains(&amount)
    }

    /// Validate game configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_bet <= 0 {
            return Err(ValidationError::InvalidMinBet);
        }
        if self.min_bet > self.max_bet {
            return Err(ValidationError::InvalidBetRange);
        }
        if !(0.0..=1.0).contains(&self.presentation_mismatch_rate) {
            return Err(ValidationError::InvalidMismatchRate);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_bet: default_min_bet(),
            max_bet: default_max_bet(),
            presentation_mismatch_rate: 0.0,
        }
    }
}

fn default_min_bet() -> i64 {
    100
}

fn default_max_bet() -> i64 {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.min_bet, 100);
        assert_eq!(config.max_bet, 100_000);
        assert_eq!(config.presentation_mismatch_rate, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_accepts_bet_bounds_inclusive() {
        let config = GameConfig::default();
        assert!(config.accepts_bet(100));
        assert!(config.accepts_bet(100_000));
        assert!(!config.accepts_bet(99));
        assert!(!config.accepts_bet(100_001));
    }

    #[test]
    fn test_validation_inverted_range() {
        let config = GameConfig {
            min_bet: 500,
            max_bet: 100,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBetRange));
    }

    #[test]
    fn test_validation_mismatch_rate_out_of_range() {
        let config = GameConfig {
            presentation_mismatch_rate: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMismatchRate));
    }
}
