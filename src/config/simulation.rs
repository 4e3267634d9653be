//! Soak simulation configuration (binary only)

use serde::Deserialize;

use super::error::ValidationError;

/// Shape of the soak run driven by the binary
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Distinct simulated players
    #[serde(default = "default_entities")]
    pub entities: usize,

    /// Rounds played by each player
    #[serde(default = "default_rounds")]
    pub rounds_per_entity: usize,

    /// Opening current balance per player, in cents
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i64,

    /// Stake per round, in cents
    #[serde(default = "default_bet")]
    pub bet: i64,
}

impl SimulationConfig {
    /// Validate simulation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.entities == 0 || self.rounds_per_entity == 0 {
            return Err(ValidationError::EmptySimulation);
        }
        if self.bet <= 0 {
            return Err(ValidationError::InvalidSimulationBet);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            rounds_per_entity: default_rounds(),
            starting_balance: default_starting_balance(),
            bet: default_bet(),
        }
    }
}

fn default_entities() -> usize {
    100
}

fn default_rounds() -> usize {
    120
}

fn default_starting_balance() -> i64 {
    100_000
}

fn default_bet() -> i64 {
    500
}
