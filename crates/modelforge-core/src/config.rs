//! Configuration schema (modelforge.toml)
//!
//! Every field has a default so a missing or partial file degrades to the
//! stock setup. CLI flags override whatever is loaded here.

use serde::{Deserialize, Serialize};

fn default_external_database() -> String {
    "default".to_string()
}

fn default_transformation_database() -> String {
    "mainnet".to_string()
}

fn default_network() -> String {
    "mainnet".to_string()
}

fn default_external_template() -> String {
    "cluster('{remote_cluster}', database.table_name)".to_string()
}

/// Database names resolved dependencies are rendered against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database holding external source tables
    #[serde(default = "default_external_database")]
    pub external: String,

    /// Database holding transformation model tables
    #[serde(default = "default_transformation_database")]
    pub transformation: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            external: default_external_database(),
            transformation: default_transformation_database(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Database names
    #[serde(default)]
    pub databases: DatabaseConfig,

    /// Network name substituted for the network scalar placeholder
    #[serde(default = "default_network")]
    pub network: String,

    /// Reference template used when rendering external dependencies
    #[serde(default = "default_external_template")]
    pub external_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            databases: DatabaseConfig::default(),
            network: default_network(),
            external_template: default_external_template(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.databases.external, "default");
        assert_eq!(config.databases.transformation, "mainnet");
        assert_eq!(config.network, "mainnet");
        assert!(config.external_template.contains("cluster("));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml("[databases]\ntransformation = \"sepolia\"\n").unwrap();
        assert_eq!(config.databases.external, "default");
        assert_eq!(config.databases.transformation, "sepolia");
        assert_eq!(config.network, "mainnet");
    }

    #[test]
    fn empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("network = [broken"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
