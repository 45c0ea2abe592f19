//! Configuration module for junban.
//!
//! This module provides all configuration types and loading functionality.
//! Configuration is loaded from a YAML file whose `containers` section
//! declares the containers to provision.

mod container;
mod docker;
mod logging;

pub use container::{ContainerDefinition, ContainerEntry, PortEntry};
pub use docker::DockerConfig;
pub use logging::{LogFormat, LogLevel, LogOutput, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::container::ContainerSpec;
use crate::error::JunbanError;

/// Files tried, in order, when no path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["config.yaml", "config.yml"];

/// Environment variable for configuration file path.
pub const ENV_CONFIG_PATH: &str = "JUNBAN_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Docker daemon configuration.
    pub docker: DockerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Declared containers, keyed by name.
    #[serde(deserialize_with = "container::deserialize_containers")]
    pub containers: BTreeMap<String, ContainerEntry>,
}

impl Config {
    /// Loads configuration from an optional path.
    /// If path is None, tries the default paths in the working directory.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, JunbanError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => {
                let found = DEFAULT_CONFIG_PATHS
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
                    .ok_or_else(|| {
                        JunbanError::config(format!(
                            "No configuration file found (tried {}); use --config or {}",
                            DEFAULT_CONFIG_PATHS.join(", "),
                            ENV_CONFIG_PATH
                        ))
                    })?;

                Self::load_from_path(found)
            }
        }
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, JunbanError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            JunbanError::config_with_source(
                format!("Failed to read config file '{}'", path.as_ref().display()),
                e,
            )
        })?;

        Self::load_from_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self, JunbanError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| JunbanError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration.
    fn validate(&self) -> Result<(), JunbanError> {
        if self.containers.is_empty() {
            return Err(JunbanError::config(
                "Missing or empty 'containers' section",
            ));
        }

        if self.docker.timeout_seconds == 0 {
            return Err(JunbanError::config("docker.timeout_seconds must be > 0"));
        }

        self.container_specs().map(|_| ())
    }

    /// Decodes every container entry, in name order.
    pub fn container_specs(&self) -> Result<Vec<ContainerSpec>, JunbanError> {
        self.containers
            .iter()
            .map(|(name, entry)| entry.to_spec(name))
            .collect()
    }
}
