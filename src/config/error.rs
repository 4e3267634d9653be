//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Cycle length must be at least 1")]
    EmptyCycle,

    #[error("Target wins {wins} exceed cycle length {length}")]
    WinsExceedLength { wins: usize, length: usize },

    #[error("Idle threshold must be positive")]
    InvalidIdleThreshold,

    #[error("Sweep interval must be positive")]
    InvalidSweepInterval,

    #[error("Maximum tracked entities must be positive")]
    InvalidCapacity,

    #[error("Minimum bet must be positive")]
    InvalidMinBet,

    #[error("Minimum bet exceeds maximum bet")]
    InvalidBetRange,

    #[error("Presentation mismatch rate must be within [0, 1]")]
    InvalidMismatchRate,

    #[error("Log level filter is empty")]
    EmptyLogLevel,

    #[error("Simulation requires at least one entity and one round")]
    EmptySimulation,

    #[error("Simulation bet must be positive")]
    InvalidSimulationBet,
}
