//! Generator configuration.
//!
//! Tunes the placement engines without code changes. Every field has a
//! default, so an empty TOML document is a valid configuration.
//!
//! ```
//! use u_timetable::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_toml_str(r#"
//!     random_seed = 7
//!     lab_capacity = 2
//! "#).unwrap();
//!
//! assert_eq!(config.random_seed, Some(7));
//! assert_eq!(config.lab_capacity, 2);
//! assert_eq!(config.block_attempt_budget, 40);
//! ```

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Placement engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// Seed for reproducible runs. `None` draws from OS entropy.
    pub random_seed: Option<u64>,

    /// Block search attempts per subject before the remainder is
    /// handed to the theory engine.
    pub block_attempt_budget: u32,

    /// Labs that may run in the same slot across all sections
    /// (finite lab rooms).
    pub lab_capacity: usize,

    /// Upper bound on blocks for an integrated subject. `None` keeps
    /// carving blocks while two or more periods remain.
    pub integrated_max_blocks: Option<u32>,

    /// Whether block subjects may take one Saturday block.
    pub saturday_blocks: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            block_attempt_budget: 40,
            lab_capacity: 3,
            integrated_max_blocks: None,
            saturday_blocks: true,
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Rejects settings the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_attempt_budget == 0 {
            return Err(ConfigError::Invalid(
                "block_attempt_budget must be at least 1".to_string(),
            ));
        }
        if self.lab_capacity == 0 {
            return Err(ConfigError::Invalid(
                "lab_capacity must be at least 1".to_string(),
            ));
        }
        if self.integrated_max_blocks == Some(0) {
            return Err(ConfigError::Invalid(
                "integrated_max_blocks must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the lab capacity per slot.
    pub fn with_lab_capacity(mut self, capacity: usize) -> Self {
        self.lab_capacity = capacity;
        self
    }

    /// Caps blocks per integrated subject.
    pub fn with_integrated_max_blocks(mut self, blocks: u32) -> Self {
        self.integrated_max_blocks = Some(blocks);
        self
    }

    /// Enables or disables Saturday blocks.
    pub fn with_saturday_blocks(mut self, enabled: bool) -> Self {
        self.saturday_blocks = enabled;
        self
    }

    /// Random source for one generation run.
    pub fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
