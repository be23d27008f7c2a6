//! # starlayer
//!
//! A semantic layer over star-schema datasets: one fact table, several dimension
//! tables, exposed as a flat catalog of named dimensions and measures.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │     Relationship Graph + Catalogs (Contoso or TOML)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [registry: load + namespace tables]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Tables with `{table}__{column}` columns           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembler: recursive left joins]
//! ┌─────────────────────────────────────────────────────────┐
//! │           SemanticModel (immutable, shared)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [translator: QueryRequest]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     QueryPlan                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [engine / SQL renderer]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 RowSet  /  SQL text                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod registry;
pub mod semantic;
pub mod sql;

pub use error::{Result, StarlayerError};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, compile_and_run, compile_sql, describe, list_dimensions, list_measures,
        ModelSpec, SemanticLayer,
    };
    pub use crate::engine::{ExecutionEngine, RowSet, SqliteEngine, Value};
    pub use crate::model::{col, lit_int, Catalog, Expr, RelationshipGraph, TableCatalog, TableReference};
    pub use crate::query::{
        DateRange, FilterCondition, Granularity, QueryPlan, QueryRequest, SortDirection,
        TimeDimension,
    };
    pub use crate::registry::{InMemorySource, TableRegistry, TableSource};
    pub use crate::semantic::{ModelAssembler, SemanticModel};
    pub use crate::sql::{Dialect, SqlDialect};
}

pub use compile::{compile, compile_and_run, SemanticLayer};
pub use query::QueryRequest;
pub use semantic::SemanticModel;
pub use sql::Dialect;
