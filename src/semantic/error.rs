//! Error types for the semantic layer.
//!
//! Two families with different blast radius:
//!
//! - [`ModelError`]: configuration problems found while assembling a model.
//!   Fatal: assembly aborts and no partial model is returned.
//! - [`QueryError`]: problems with a single request. They fail that request
//!   only and never touch the shared model.

use thiserror::Error;

use crate::model::expr::ExprError;
use crate::registry::RegistryError;

/// Result type for model assembly.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type for query translation.
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("root table '{0}' is not declared in the relationship graph")]
    UnknownRoot(String),

    #[error("invalid reference from '{from}' to '{to}': {message}")]
    InvalidReference {
        from: String,
        to: String,
        message: String,
    },

    #[error("cyclic table references: {}", .0.join(" -> "))]
    CyclicReferences(Vec<String>),

    #[error("table '{table}' is not reachable from root '{root}'")]
    UnreachableTable { table: String, root: String },

    #[error("referenced table '{to}' (from '{from}') was not loaded")]
    UnresolvedReference { from: String, to: String },

    #[error("table '{table}' is reachable along more than one reference path")]
    MultiplePaths { table: String },

    #[error("join column '{column}' does not exist on table '{table}'")]
    UnknownJoinColumn { table: String, column: String },

    #[error("namespaced column '{column}' appears in both '{first_table}' and '{second_table}'")]
    ColumnCollision {
        column: String,
        first_table: String,
        second_table: String,
    },

    #[error("'{entry}' on table '{table}' references unknown column '{column}'")]
    UnknownColumn {
        table: String,
        entry: String,
        column: String,
    },

    #[error("'{entry}' on table '{table}' is invalid: {source}")]
    InvalidExpression {
        table: String,
        entry: String,
        #[source]
        source: ExprError,
    },

    #[error("duplicate name '{name}' (defined on '{first_table}' and '{second_table}')")]
    DuplicateName {
        name: String,
        first_table: String,
        second_table: String,
    },

    #[error("failed to fingerprint model: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("unsupported operator '{operator}' in filter on '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("none of the requested measures or dimensions exist in the model")]
    EmptySelection,
}
