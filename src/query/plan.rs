//! The executable form of a request.
//!
//! A plan is built fresh per request by the
//! [`QueryTranslator`](super::QueryTranslator) and never shared.

use serde::{Deserialize, Serialize};

use crate::model::expr::Expr;
use crate::query::request::{FilterOperator, FilterValue, SortDirection};
use crate::semantic::model::Relation;
use crate::sql::{render, Dialect};

/// How the selected fields are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanShape {
    /// Measures grouped by dimensions
    Grouped,
    /// Measures over the whole relation: one row
    Aggregate,
    /// Distinct dimension values
    Distinct,
}

/// A selected catalog field, output under its short name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputField {
    pub name: String,
    pub expr: Expr,
}

/// `expr op value`. Predicates of a plan are combined with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Catalog name the predicate was resolved from
    pub field: String,
    pub expr: Expr,
    pub op: FilterOperator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Output name of a selected field
    pub name: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub relation: Relation,
    pub shape: PlanShape,
    /// Group keys (or distinct projection)
    pub dimensions: Vec<OutputField>,
    pub measures: Vec<OutputField>,
    /// Row-level predicates, applied before aggregation
    pub predicates: Vec<Predicate>,
    /// Predicates on measures, applied after aggregation
    pub having: Vec<Predicate>,
    pub order_by: Vec<SortKey>,
    /// `None` means unlimited
    pub limit: Option<u64>,
    pub offset: u64,
}

impl QueryPlan {
    /// Output column names: dimensions first, then measures.
    pub fn output_columns(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .chain(self.measures.iter())
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.shape, PlanShape::Grouped | PlanShape::Aggregate)
    }

    /// Render the plan as a single SQL statement.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        render::render_plan(self, dialect)
    }
}
