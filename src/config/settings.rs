//! TOML-based configuration for starlayer.
//!
//! Example configuration:
//! ```toml
//! [source]
//! driver = "sqlite"
//! path = "${STARLAYER_DATA}/contoso.db"
//!
//! [model]
//! root = "fact_sales"
//! definition = "./model.toml"   # omit to use the built-in Contoso catalog
//! bookkeeping_prefix = "_dlt_"
//!
//! [query]
//! dialect = "duckdb"
//! default_limit = 500
//!
//! [logging]
//! filter = "starlayer=debug"
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::contoso;
use crate::model::table::DEFAULT_BOOKKEEPING_PREFIX;
use crate::query::request::DEFAULT_LIMIT;
use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STARLAYER_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("could not read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("invalid TOML in config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("environment variable ${0} is not set")]
    MissingEnvVar(String),

    #[error("unsupported source driver '{0}' (expected sqlite)")]
    UnsupportedDriver(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Everything `starlayer.toml` can set; every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub model: ModelSettings,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

/// Supported table source / engine drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

impl FromStr for Driver {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            _ => Err(SettingsError::UnsupportedDriver(s.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Where the loaded tables live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Database driver (sqlite).
    pub driver: String,

    /// Database path (supports ${ENV_VAR} expansion). `:memory:` for an empty
    /// in-memory database.
    pub path: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            path: "contoso.db".to_string(),
        }
    }
}

impl SourceSettings {
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        self.driver.parse()
    }

    /// Get the path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.path)
    }
}

/// Which model to assemble.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Root fact table. Ignored when a definition file names its own root.
    pub root: String,

    /// TOML model definition; the built-in Contoso catalog when unset.
    pub definition: Option<String>,

    /// Columns starting with this prefix are dropped on load.
    pub bookkeeping_prefix: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            root: contoso::ROOT.to_string(),
            definition: None,
            bookkeeping_prefix: DEFAULT_BOOKKEEPING_PREFIX.to_string(),
        }
    }
}

impl ModelSettings {
    pub fn resolved_definition(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.definition
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Dialect used when printing compiled SQL.
    pub dialect: Dialect,

    /// Limit applied to requests that do not set one.
    pub default_limit: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` env-filter directive, overridden by `STARLAYER_LOG`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Read and validate one TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Find the config file, or fall back to defaults.
    ///
    /// Searches in order:
    /// 1. Environment variable `STARLAYER_CONFIG`
    /// 2. `./starlayer.toml`
    /// 3. `<config dir>/starlayer/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("starlayer.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("starlayer").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.source.driver_type()?;
        if self.model.root.trim().is_empty() && self.model.definition.is_none() {
            return Err(SettingsError::InvalidConfig(
                "model.root must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Substitute environment variables into a config value.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
