//! High-level entry points.
//!
//! ```text
//! TableSource ─► TableRegistry ─► ModelAssembler ─► SemanticModel
//!                                                     │
//!                    QueryRequest ─► QueryTranslator ─┴─► QueryPlan ─► ExecutionEngine ─► RowSet
//! ```
//!
//! # Example
//!
//! ```ignore
//! use starlayer::compile::{compile_and_run, SemanticLayer};
//! use starlayer::engine::SqliteEngine;
//! use starlayer::query::QueryRequest;
//!
//! let engine = SqliteEngine::open("contoso.db")?;
//! let layer = SemanticLayer::contoso(engine)?;
//! let request = QueryRequest::new().measure("totalRevenue").dimension("country");
//! let rows = layer.query(&request)?;
//! ```

use tracing::debug;

use crate::config::Settings;
use crate::engine::{ExecutionEngine, RowSet, SqliteEngine};
use crate::error::Result;
use crate::model::catalog::Catalog;
use crate::model::contoso;
use crate::model::definition::ModelDefinition;
use crate::model::references::RelationshipGraph;
use crate::model::table::DEFAULT_BOOKKEEPING_PREFIX;
use crate::query::plan::QueryPlan;
use crate::query::request::QueryRequest;
use crate::query::translator::QueryTranslator;
use crate::registry::{TableRegistry, TableSource};
use crate::semantic::error::{ModelResult, QueryResult};
use crate::semantic::model::{ModelDescription, SemanticModel};
use crate::semantic::ModelAssembler;
use crate::sql::Dialect;

// ============================================================================
// Model Assembly
// ============================================================================

/// The hand-authored part of a model: root, references and catalogs.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub root: String,
    pub graph: RelationshipGraph,
    pub catalog: Catalog,
}

impl ModelSpec {
    /// The built-in Contoso retail star schema.
    pub fn contoso() -> Self {
        Self {
            root: contoso::ROOT.to_string(),
            graph: contoso::relationship_graph(),
            catalog: contoso::catalog(),
        }
    }

    pub fn from_definition(definition: &ModelDefinition) -> Result<Self> {
        Ok(Self {
            root: definition.root.clone(),
            graph: definition.relationship_graph(),
            catalog: definition.catalog()?,
        })
    }

    /// Load tables from `source` and assemble the model.
    pub fn assemble<S: TableSource>(
        &self,
        source: S,
        bookkeeping_prefix: &str,
    ) -> ModelResult<SemanticModel> {
        let registry = TableRegistry::new(source).with_bookkeeping_prefix(bookkeeping_prefix);
        ModelAssembler::new(&self.graph, &self.catalog, &self.root).assemble(&registry)
    }
}

// ============================================================================
// Query Entry Points
// ============================================================================

/// Translate a request into a plan.
pub fn compile(model: &SemanticModel, request: &QueryRequest) -> QueryResult<QueryPlan> {
    QueryTranslator::new(model).translate(request)
}

/// Translate a request and render it as SQL.
pub fn compile_sql(
    model: &SemanticModel,
    request: &QueryRequest,
    dialect: Dialect,
) -> QueryResult<String> {
    Ok(compile(model, request)?.to_sql(dialect))
}

/// Translate a request and execute it.
///
/// Engines that do not paginate themselves get their rows sliced to
/// `[offset, offset + limit)` here.
pub fn compile_and_run<E: ExecutionEngine>(
    model: &SemanticModel,
    engine: &E,
    request: &QueryRequest,
) -> Result<RowSet> {
    let plan = compile(model, request)?;
    let rows = engine.execute(&plan)?;
    if engine.applies_pagination() {
        Ok(rows)
    } else {
        debug!(offset = plan.offset, limit = ?plan.limit, "paginating engine result");
        Ok(rows.paginate(plan.offset, plan.limit))
    }
}

pub fn list_dimensions(model: &SemanticModel) -> Vec<&str> {
    model.list_dimensions()
}

pub fn list_measures(model: &SemanticModel) -> Vec<&str> {
    model.list_measures()
}

pub fn describe(model: &SemanticModel) -> ModelDescription {
    model.describe()
}

// ============================================================================
// Context Object
// ============================================================================

/// An assembled model together with the engine that runs its queries.
///
/// Built once at startup and passed by reference to whatever serves requests.
pub struct SemanticLayer<E> {
    model: SemanticModel,
    engine: E,
}

impl<E: ExecutionEngine> SemanticLayer<E> {
    pub fn new(model: SemanticModel, engine: E) -> Self {
        Self { model, engine }
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn compile(&self, request: &QueryRequest) -> QueryResult<QueryPlan> {
        compile(&self.model, request)
    }

    pub fn query(&self, request: &QueryRequest) -> Result<RowSet> {
        compile_and_run(&self.model, &self.engine, request)
    }
}

impl<E: ExecutionEngine + TableSource> SemanticLayer<E> {
    /// Assemble `spec` from the engine's own tables.
    pub fn assemble(spec: &ModelSpec, engine: E, bookkeeping_prefix: &str) -> Result<Self> {
        let model = spec.assemble(&engine, bookkeeping_prefix)?;
        Ok(Self::new(model, engine))
    }

    /// The Contoso model over the engine's tables, with the default bookkeeping prefix.
    pub fn contoso(engine: E) -> Result<Self> {
        Self::assemble(&ModelSpec::contoso(), engine, DEFAULT_BOOKKEEPING_PREFIX)
    }
}

impl SemanticLayer<SqliteEngine> {
    /// Open the configured source and assemble the configured model.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.source.driver_type()?;
        let path = settings.source.resolved_path()?;
        let engine = if path == ":memory:" {
            SqliteEngine::open_in_memory()?
        } else {
            SqliteEngine::open(&path)?
        };

        let spec = match settings.model.resolved_definition()? {
            Some(path) => ModelSpec::from_definition(&ModelDefinition::from_file(path)?)?,
            None => ModelSpec {
                root: settings.model.root.clone(),
                ..ModelSpec::contoso()
            },
        };

        Self::assemble(&spec, engine, &settings.model.bookkeeping_prefix)
    }
}
