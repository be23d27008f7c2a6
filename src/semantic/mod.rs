//! Semantic layer: assembling a star schema into one queryable model.
//!
//! The assembler is the only place a [`SemanticModel`] is built. Once built the
//! model is immutable and can be shared across threads by reference.

pub mod assembler;
pub mod error;
pub mod fingerprint;
pub mod model;

pub use assembler::ModelAssembler;
pub use error::{ModelError, ModelResult, QueryError, QueryResult};
pub use model::{
    field_name, FieldDescription, JoinKind, JoinSpec, ModelDescription, Relation, SemanticModel,
};
