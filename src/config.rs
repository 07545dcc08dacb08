//! Experiment configuration.
//!
//! Loaded from TOML and validated before any run starts. Every parameter
//! that shapes a run lives here; nothing in the engine is hard-coded
//! beyond the one-unit tick and I/O durations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{SimError, SimResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// An inclusive integer range a per-process quantity is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DemandRange {
    pub min: u32,
    pub max: u32,
}

impl DemandRange {
    pub fn new(min: u32, max: u32) -> Self {
        DemandRange { min, max }
    }

    fn validate(&self, name: &str) -> SimResult<()> {
        if self.min == 0 || self.min > self.max {
            return Err(SimError::InvalidConfig(format!(
                "{} range must satisfy 1 <= min <= max, got {}..={}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for DemandRange {
    fn default() -> Self {
        DemandRange { min: 1, max: 10 }
    }
}

/// All inputs of a batch of experiments.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimConfig {
    /// Total allocatable memory units.
    pub ram_capacity: u32,
    /// Instructions consumed per CPU tick.
    pub tick_capacity: u32,
    /// Mean of the exponential inter-arrival gap.
    pub mean_interval: f64,
    /// One experiment per entry, run in order.
    pub workload_sizes: Vec<usize>,
    /// Seeds the single random stream shared by the whole batch.
    pub seed: u64,
    /// A process enters I/O after a tick with probability 1/K.
    pub wait_denominator: u32,
    #[serde(default)]
    pub memory_demand: DemandRange,
    #[serde(default)]
    pub instructions: DemandRange,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            ram_capacity: 100,
            tick_capacity: 3,
            mean_interval: 10.0,
            workload_sizes: vec![25, 50, 100, 150, 200],
            seed: 42,
            wait_denominator: 21,
            memory_demand: DemandRange::default(),
            instructions: DemandRange::default(),
        }
    }
}

impl SimConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter, including that the largest possible memory
    /// demand fits in the pool.
    pub fn validate(&self) -> SimResult<()> {
        if self.ram_capacity == 0 {
            return Err(SimError::InvalidConfig("ram_capacity must be positive".into()));
        }
        if self.tick_capacity == 0 {
            return Err(SimError::InvalidConfig("tick_capacity must be positive".into()));
        }
        if !(self.mean_interval.is_finite() && self.mean_interval > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "mean_interval must be a positive number, got {}",
                self.mean_interval
            )));
        }
        if self.workload_sizes.is_empty() {
            return Err(SimError::InvalidConfig("workload_sizes must not be empty".into()));
        }
        if self.workload_sizes.contains(&0) {
            return Err(SimError::InvalidConfig(
                "workload_sizes must all be positive".into(),
            ));
        }
        if self.wait_denominator == 0 {
            return Err(SimError::InvalidConfig("wait_denominator must be at least 1".into()));
        }
        self.memory_demand.validate("memory_demand")?;
        self.instructions.validate("instructions")?;

        if self.memory_demand.max > self.ram_capacity {
            return Err(SimError::CapacityExceeded {
                demand: self.memory_demand.max,
                capacity: self.ram_capacity,
            });
        }
        Ok(())
    }

    // ── Fluent setters ────────────────────────────────────────

    pub fn with_ram_capacity(mut self, units: u32) -> Self {
        self.ram_capacity = units;
        self
    }

    pub fn with_tick_capacity(mut self, instructions: u32) -> Self {
        self.tick_capacity = instructions;
        self
    }

    pub fn with_mean_interval(mut self, mean: f64) -> Self {
        self.mean_interval = mean;
        self
    }

    pub fn with_workload_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.workload_sizes = sizes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_wait_denominator(mut self, k: u32) -> Self {
        self.wait_denominator = k;
        self
    }

    pub fn with_memory_demand(mut self, min: u32, max: u32) -> Self {
        self.memory_demand = DemandRange::new(min, max);
        self
    }

    pub fn with_instructions(mut self, min: u32, max: u32) -> Self {
        self.instructions = DemandRange::new(min, max);
        self
    }
}

/// Read, parse and validate a TOML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    SimConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
ram_capacity = 100
tick_capacity = 6
mean_interval = 10.0
workload_sizes = [25, 50]
seed = 7
wait_denominator = 2

[memory_demand]
min = 2
max = 8
"#;

    #[test]
    fn test_default_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn test_parse_toml() {
        let config = SimConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.tick_capacity, 6);
        assert_eq!(config.wait_denominator, 2);
        assert_eq!(config.workload_sizes, vec![25, 50]);
        assert_eq!(config.memory_demand, DemandRange::new(2, 8));
        // Omitted ranges fall back to 1..=10.
        assert_eq!(config.instructions, DemandRange::new(1, 10));
    }

    #[test]
    fn test_missing_required_key_is_parse_error() {
        let err = SimConfig::from_toml_str("ram_capacity = 100\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_capacity_below_max_demand_is_rejected() {
        let err = SimConfig::default().with_ram_capacity(9).validate().unwrap_err();
        assert_eq!(
            err,
            SimError::CapacityExceeded {
                demand: 10,
                capacity: 9
            }
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let bad = [
            SimConfig::default().with_tick_capacity(0),
            SimConfig::default().with_mean_interval(0.0),
            SimConfig::default().with_mean_interval(f64::NAN),
            SimConfig::default().with_workload_sizes(vec![]),
            SimConfig::default().with_workload_sizes(vec![10, 0]),
            SimConfig::default().with_wait_denominator(0),
            SimConfig::default().with_instructions(0, 3),
            SimConfig::default().with_memory_demand(5, 4),
        ];
        for config in bad {
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, SimError::InvalidConfig(_)),
                "expected InvalidConfig for {:?}, got {:?}",
                config,
                err
            );
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.replace("ram_capacity = 100", "ram_capacity = 5").as_bytes())
            .unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(SimError::CapacityExceeded {
                demand: 8,
                capacity: 5
            })
        ));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/procsim.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
