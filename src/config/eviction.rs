//! Eviction configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Idle expiry, sweep cadence and capacity of the cycle store
#[derive(Debug, Clone, Deserialize)]
pub struct EvictionConfig {
    /// Records idle longer than this are removed by the sweep
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold_secs: u64,

    /// Time between background sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Tracked records allowed after a sweep
    #[serde(default = "default_max_tracked")]
    pub max_tracked_entities: usize,
}

impl EvictionConfig {
    /// Get idle threshold as Duration
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate eviction configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_threshold_secs == 0 {
            return Err(ValidationError::InvalidIdleThreshold);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        if self.max_tracked_entities == 0 {
            return Err(ValidationError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: default_idle_threshold(),
            sweep_interval_secs: default_sweep_interval(),
            max_tracked_entities: default_max_tracked(),
        }
    }
}

fn default_idle_threshold() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    60 * 60
}

fn default_max_tracked() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_config_defaults() {
        let config = EvictionConfig::default();
        assert_eq!(config.idle_threshold(), Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval(), Duration::from_secs(3_600));
        assert_eq!(config.max_tracked_entities, 10_000);
    }

    #[test]
    fn test_validation_zero_capacity() {
        let config = EvictionConfig {
            max_tracked_entities: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCapacity));
    }

    #[test]
    fn test_validation_zero_interval() {
        let config = EvictionConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
