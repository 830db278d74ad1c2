//! Configuration loading and base URL resolution
//!
//! Priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is never fatal: a warning is logged and defaults apply.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Environment override for the prediction backend base URL
pub const API_URL_ENV: &str = "TMZ_API_URL";
/// Loopback default for the prediction backend
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "tamizajes";
/// File holding UI preferences such as the theme
pub const PREFERENCES_FILE_NAME: &str = "preferences.toml";

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `<config_dir>/tamizajes/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Prediction backend base URL
    #[serde(default)]
    pub api_url: Option<String>,
    /// Dashboard listening port
    #[serde(default)]
    pub port: Option<u16>,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Override for the UI preferences file location
    #[serde(default)]
    pub preferences_file: Option<PathBuf>,
}

/// Platform config directory for tamizajes (e.g. `~/.config/tamizajes`)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(CONFIG_DIR_NAME))
}

/// Default TOML path for a module (e.g. `~/.config/tamizajes/tmz-dash.toml`)
pub fn default_config_path(module_name: &str) -> PathBuf {
    config_dir().join(format!("{}.toml", module_name))
}

/// Default UI preferences path
pub fn default_preferences_path() -> PathBuf {
    config_dir().join(PREFERENCES_FILE_NAME)
}

/// Load TOML config from `path`.
///
/// A missing file yields defaults. A present but unparsable file is an error,
/// since silently ignoring it would hide a misconfiguration.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write a serializable value as TOML, atomically (temp file + rename)
pub fn write_toml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(value)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Resolve the prediction backend base URL.
///
/// **Priority:** CLI → `TMZ_API_URL` → TOML `api_url` → `http://127.0.0.1:8000`
///
/// The winning value is validated; an invalid URL is a configuration error
/// rather than a silent fallback.
pub fn resolve_api_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_value = std::env::var(API_URL_ENV).ok();

    let (url, source) = if let Some(url) = non_blank(cli_arg) {
        (url.to_string(), "command line")
    } else if let Some(url) = non_blank(env_value.as_deref()) {
        (url.to_string(), "environment")
    } else if let Some(url) = non_blank(toml_config.api_url.as_deref()) {
        (url.to_string(), "TOML config")
    } else {
        (DEFAULT_API_URL.to_string(), "compiled default")
    };

    crate::http::parse_base_url(&url)?;

    info!("Prediction API base URL {} (from {})", url, source);
    Ok(url)
}

/// Resolve the listening port: CLI → TOML → `default_port`
pub fn resolve_port(cli_arg: Option<u16>, toml_config: &TomlConfig, default_port: u16) -> u16 {
    cli_arg.or(toml_config.port).unwrap_or(default_port)
}

/// Resolve the preferences file: TOML override → platform default
pub fn resolve_preferences_path(toml_config: &TomlConfig) -> PathBuf {
    toml_config
        .preferences_file
        .clone()
        .unwrap_or_else(default_preferences_path)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
