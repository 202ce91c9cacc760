//! Configuration file
//!
//! ```json
//! { "data_dir": "/data/docstore", "default_page_limit": 10, "log_level": "info" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Page size used by `list` when no limit is given (default 10)
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,

    /// Largest page size `list` accepts (default 1000)
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,

    /// Lowest log severity emitted (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_page_limit() -> usize {
    10
}
fn default_max_page_limit() -> usize {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Create a config with defaults for everything but the data directory
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.default_page_limit == 0 {
            return Err(CliError::config_error("default_page_limit must be > 0"));
        }

        if self.max_page_limit < self.default_page_limit {
            return Err(CliError::config_error(format!(
                "max_page_limit ({}) must be >= default_page_limit ({})",
                self.max_page_limit, self.default_page_limit
            )));
        }

        self.severity()?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Parsed log level
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }
}
