//! Engine configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DomainConfig;
use crate::inference::{MaxWalkSatConfig, McSatConfig};

/// Errors from loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration aggregating every component's settings.
///
/// ```toml
/// [domain]
/// closed_world = false
/// liquidity = { only = ["P"] }
///
/// [maxwalksat]
/// max_iterations = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub domain: DomainConfig,
    pub maxwalksat: MaxWalkSatConfig,
    pub mcsat: McSatConfig,
}

impl EngineConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
