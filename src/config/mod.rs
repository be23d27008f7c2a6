//! Configuration: config file discovery, environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, Driver, LoggingSettings, ModelSettings, QuerySettings, Settings,
    SettingsError, SourceSettings, CONFIG_ENV,
};
