//! Configuration file
//!
//! A single JSON document; every field is optional.
//!
//! ```json
//! {
//!   "server":    { "host": "0.0.0.0", "port": 8080, "cors_origins": [] },
//!   "storage":   { "backend": "sqlite", "url": "sqlite://roster.db" },
//!   "seed_path": "seed.json",
//!   "log":       { "filter": "info", "format": "json" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::LogConfig;
use crate::storage::StorageConfig;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Storage backend (default: in-memory)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Seed document applied at boot. Relative paths resolve against the
    /// config file's directory.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let (Some(seed), Some(dir)) = (config.seed_path.as_ref(), path.parent()) {
            if seed.is_relative() {
                config.seed_path = Some(dir.join(seed));
            }
        }

        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.server.port == 0 {
            return Err(CliError::config_error("server.port must be > 0"));
        }

        if self.server.host.is_empty() {
            return Err(CliError::config_error("server.host must not be empty"));
        }

        if let StorageConfig::Sqlite(sqlite) = &self.storage {
            if sqlite.url.is_empty() {
                return Err(CliError::config_error("storage.url must not be empty"));
            }
            if sqlite.max_connections == 0 {
                return Err(CliError::config_error(
                    "storage.max_connections must be > 0",
                ));
            }
        }

        self.log
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        Ok(())
    }
}
