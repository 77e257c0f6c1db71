//! YAML configuration for an import run.
//!
//! Mirrors the layout of `nebula_config.yaml`: store endpoints and
//! credentials, input table paths, import tuning, and the logging sink.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::LoadError;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nebula: NebulaConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store endpoints, credentials, and target space.
#[derive(Debug, Clone, Deserialize)]
pub struct NebulaConfig {
    /// Gateway endpoints, tried in order until one accepts the connection.
    pub hosts: Vec<HostConfig>,
    pub username: String,
    pub password: String,
    pub space_name: String,
    #[serde(default)]
    pub connection_pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub host: String,
    pub port: u16,
}

/// Connection-pool sizing, in seconds where applicable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout: u64,
    pub idle_time: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_size: 10,
            timeout: 30,
            idle_time: 3600,
        }
    }
}

/// Input table locations.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub entities_file: PathBuf,
    pub relationships_file: PathBuf,
}

/// Import tuning knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Rows per bulk INSERT statement.
    pub batch_size: usize,
    /// Extra attempts per statement after the first.
    pub max_retries: u32,
    /// Fixed delay between attempts, in seconds.
    pub retry_delay: u64,
    /// Emit a progress log line per completed batch.
    pub enable_progress: bool,
    /// Reconcile stored counts against expected counts after the import.
    pub validate_data: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            batch_size: 500,
            max_retries: 3,
            retry_delay: 2,
            enable_progress: true,
            validate_data: true,
        }
    }
}

impl ImportConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

/// Logging sink configuration. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Optional log file; logs go to stderr as well.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<AppConfig, LoadError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Config(format!("reading {}: {e}", path.display())))?;
        let config: AppConfig = serde_yaml::from_str(&raw)
            .map_err(|e| LoadError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.nebula.hosts.is_empty() {
            return Err(LoadError::Config("no store hosts configured".to_string()));
        }
        if self.import.batch_size == 0 {
            return Err(LoadError::Config("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
