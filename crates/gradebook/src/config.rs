//! Project configuration file support for gradebook.
//!
//! Loads configuration from `gradebook.toml` in the working directory.

use anyhow::{Context, Result};
use gradebook_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project-level configuration loaded from `gradebook.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Database connection string
    pub database_url: Option<String>,
    /// Where `backup` writes when no path is given
    pub backup_path: Option<PathBuf>,
    /// Default tracing level
    pub log_level: Option<String>,
    /// Default log output format
    pub log_format: Option<LogFormat>,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the `serve` command
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "gradebook.toml";

pub const DEFAULT_BACKUP_PATH: &str = "students_backup.txt";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Environment variables consulted for the database url, in priority order.
const DATABASE_URL_VARS: &[&str] = &["GRADEBOOK_DATABASE_URL", "DATABASE_URL"];

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Get the effective database url.
    /// Priority: CLI flag > environment > config file > None (default location)
    pub fn database_url(&self, cli: Option<&str>) -> Option<String> {
        self.database_url_with(cli, |key| std::env::var(key).ok())
    }

    fn database_url_with(
        &self,
        cli: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| DATABASE_URL_VARS.iter().find_map(|key| env(key)))
            .or_else(|| self.database_url.clone())
    }

    /// Get the effective server port.
    /// Priority: CLI flag > `PORT` > config file > 5000
    pub fn port(&self, cli: Option<u16>) -> u16 {
        self.port_with(cli, |key| std::env::var(key).ok())
    }

    fn port_with(&self, cli: Option<u16>, env: impl Fn(&str) -> Option<String>) -> u16 {
        cli.or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .or(self.server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    /// Get the effective server host.
    /// Priority: CLI flag > config file > 0.0.0.0
    pub fn host(&self, cli: Option<&str>) -> String {
        cli.or(self.server.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
            .to_string()
    }

    /// Get the effective backup path.
    /// Priority: CLI flag > config file > students_backup.txt
    pub fn backup_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.backup_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_PATH))
    }

    /// Get the effective log level.
    /// Priority: CLI flag > config file > warn
    pub fn log_level(&self, cli: Option<&str>) -> String {
        cli.or(self.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string()
    }

    /// Get the effective log format.
    /// Priority: CLI flag > config file > pretty
    pub fn log_format(&self, cli: Option<LogFormat>) -> LogFormat {
        cli.or(self.log_format).unwrap_or_default()
    }
}
