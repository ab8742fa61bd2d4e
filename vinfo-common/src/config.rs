//! Configuration loading and data folder resolution
//!
//! Bootstrap settings come from a TOML file and are then overridden by
//! environment variables. Config file location priority:
//! 1. Command-line argument (highest priority)
//! 2. `VINFO_CONFIG` environment variable
//! 3. `<config_dir>/vinfo/config.toml`
//! 4. Built-in defaults (no file at all)
//!
//! A missing or malformed file never stops the caller: a warning is logged and
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VINFO_CONFIG";

const NATIONAL_BASE_URL_ENV: &str = "VINFO_NATIONAL_BASE_URL";
const NATIONAL_API_KEY_ENV: &str = "VINFO_NATIONAL_API_KEY";
const OPENDATA_BASE_URL_ENV: &str = "VINFO_OPENDATA_BASE_URL";
const OPENDATA_API_KEY_ENV: &str = "VINFO_OPENDATA_API_KEY";
const DATABASE_PATH_ENV: &str = "VINFO_DATABASE_PATH";
const LOG_LEVEL_ENV: &str = "VINFO_LOG_LEVEL";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database holding vehicle type templates (optional)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Timeout applied to every external registry call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// National (authoritative) vehicle registry
    #[serde(default)]
    pub national_registry: RegistrySettings,

    /// Secondary open-data source, enrichment only
    #[serde(default)]
    pub open_data: RegistrySettings,

    /// Plate to report for a specific VIN when no source returns one
    #[serde(default)]
    pub fallback_plates: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Connection settings for one registry
///
/// Both values must be present and non-blank, otherwise the client built from
/// these settings stays disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
            national_registry: RegistrySettings::default(),
            open_data: RegistrySettings::default(),
            fallback_plates: HashMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RegistrySettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            api_key: Some(api_key.into()),
        }
    }

    /// Trimmed (base_url, api_key) pair, or None if either is missing
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let base_url = non_blank(self.base_url.as_deref())?;
        let api_key = non_blank(self.api_key.as_deref())?;
        Some((base_url, api_key))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.fallback_plates = config
            .fallback_plates
            .into_iter()
            .map(|(vin, plate)| (normalize_key(&vin), plate.trim().to_string()))
            .filter(|(vin, plate)| !vin.is_empty() && !plate.is_empty())
            .collect();
        Ok(config)
    }

    /// Override file values with non-empty environment variables
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.national_registry.base_url, NATIONAL_BASE_URL_ENV);
        override_from_env(&mut self.national_registry.api_key, NATIONAL_API_KEY_ENV);
        override_from_env(&mut self.open_data.base_url, OPENDATA_BASE_URL_ENV);
        override_from_env(&mut self.open_data.api_key, OPENDATA_API_KEY_ENV);

        if let Some(path) = env_value(DATABASE_PATH_ENV) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(level) = env_value(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
    }

    /// Per-call timeout for external registries
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Configured database path, or `<data folder>/vinfo.db`
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| default_data_folder().join("vinfo.db"))
    }
}

/// Locate the config file following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = env_value(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Per-user config directory
    dirs::config_dir()
        .map(|d| d.join("vinfo").join("config.toml"))
        .filter(|p| p.exists())
}

/// Outcome of resolving and reading the config file
///
/// Carries what happened so the caller can log it once its subscriber is
/// installed.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// File the configuration was read from, if any
    pub path: Option<PathBuf>,
    /// Read or parse failure that caused the fallback to defaults
    pub error: Option<Error>,
}

impl LoadedConfig {
    /// Log how the configuration was obtained
    pub fn log(&self) {
        match (&self.path, &self.error) {
            (_, Some(e)) => warn!("{} - using defaults", e),
            (Some(path), None) => info!("Loaded configuration from {}", path.display()),
            (None, None) => debug!("No config file found, using defaults"),
        }
    }
}

/// Resolve and read the config file without logging, then apply env overrides
///
/// A missing or malformed file yields defaults; the failure is kept in
/// `LoadedConfig::error`.
pub fn read_config(cli_arg: Option<&Path>) -> LoadedConfig {
    let (mut config, path, error) = match resolve_config_path(cli_arg) {
        Some(path) => match TomlConfig::load(&path) {
            Ok(config) => (config, Some(path), None),
            Err(e) => (TomlConfig::default(), None, Some(e)),
        },
        None => (TomlConfig::default(), None, None),
    };

    config.apply_env_overrides();
    LoadedConfig {
        config,
        path,
        error,
    }
}

/// Load configuration with graceful degradation, then apply env overrides
pub fn load_config(cli_arg: Option<&Path>) -> TomlConfig {
    let loaded = read_config(cli_arg);
    loaded.log();
    loaded.config
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vinfo"))
        .unwrap_or_else(|| PathBuf::from("./vinfo_data"))
}

fn override_from_env(slot: &mut Option<String>, var: &str) {
    if let Some(value) = env_value(var) {
        *slot = Some(value);
    }
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_key(vin: &str) -> String {
    vin.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}
