//! Service configuration
//!
//! Loaded from (later sources override earlier):
//! 1. Default values
//! 2. TOML file (`budget.toml` unless a path is given)
//! 3. Environment variables prefixed with `BUDGET_`

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "budget.toml";

/// Hard ceiling on projection horizons
pub const MAX_HORIZON_YEARS: u32 = 20;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// CSV file backing the asset store
    pub assets_path: PathBuf,

    /// CSV file backing the financial plan store; created on first write
    pub plans_path: PathBuf,

    /// CSV file of bearer tokens for the token-table gate
    pub tokens_path: PathBuf,

    /// Horizon used when a request does not give one
    pub default_horizon: u32,

    /// Largest horizon a caller may request
    pub max_horizon: u32,

    /// Largest asset listing page a caller may request
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            assets_path: PathBuf::from("data/assets.csv"),
            plans_path: PathBuf::from("data/financial_plans.csv"),
            tokens_path: PathBuf::from("data/tokens.csv"),
            default_horizon: 5,
            max_horizon: MAX_HORIZON_YEARS,
            max_page_size: 100,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load configuration with a specific TOML file. A missing file is skipped.
    pub fn load_from(config_file: &Path) -> Result<Self, ConfigError> {
        let config: ServiceConfig = Figment::new()
            .merge(Serialized::defaults(ServiceConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("BUDGET_"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_horizon == 0 || self.max_horizon > MAX_HORIZON_YEARS {
            return Err(ConfigError::Validation {
                message: format!(
                    "max_horizon must be between 1 and {MAX_HORIZON_YEARS}, got {}",
                    self.max_horizon
                ),
            });
        }

        if self.default_horizon == 0 || self.default_horizon > self.max_horizon {
            return Err(ConfigError::Validation {
                message: format!(
                    "default_horizon ({}) must be between 1 and max_horizon ({})",
                    self.default_horizon, self.max_horizon
                ),
            });
        }

        if self.max_page_size == 0 {
            return Err(ConfigError::Validation {
                message: "max_page_size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
