//! Crate-level error type for the high-level entry points.

use thiserror::Error;

use crate::config::SettingsError;
use crate::engine::EngineError;
use crate::model::definition::DefinitionError;
use crate::semantic::error::{ModelError, QueryError};

#[derive(Debug, Error)]
pub enum StarlayerError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Model definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Execution error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    Request(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StarlayerError>;
