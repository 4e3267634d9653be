//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `OUTCOME_CYCLE` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a working setup.
//!
//! # Example
//!
//! ```no_run
//! use outcome_cycle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cycle of {} with {} wins", config.cycle.length, config.cycle.target_wins);
//! ```

mod cycle;
mod error;
mod eviction;
mod game;
mod simulation;
mod telemetry;

pub use cycle::CycleConfig;
pub use error::{ConfigError, ValidationError};
pub use eviction::EvictionConfig;
pub use game::GameConfig;
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Cycle shape (length, target wins)
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Idle expiry, sweep cadence and capacity
    #[serde(default)]
    pub eviction: EvictionConfig,

    /// Bet bounds and presentation
    #[serde(default)]
    pub game: GameConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Soak run settings for the binary
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `OUTCOME_CYCLE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `OUTCOME_CYCLE__CYCLE__LENGTH=12` -> `cycle.length = 12`
    /// - `OUTCOME_CYCLE__EVICTION__MAX_TRACKED_ENTITIES=500` -> `eviction.max_tracked_entities = 500`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("OUTCOME_CYCLE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cycle.validate()?;
        self.eviction.validate()?;
        self.game.validate()?;
        self.telemetry.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}
