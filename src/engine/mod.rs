//! Execution handoff: running a plan and collecting its rows.

mod sqlite;

pub use sqlite::SqliteEngine;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::plan::QueryPlan;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("engine connection lock was poisoned")]
    Poisoned,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Runs query plans.
///
/// Engines either push pagination into the query they run (and return
/// `true` from [`applies_pagination`](Self::applies_pagination)) or return every
/// row and let the caller slice them.
pub trait ExecutionEngine {
    fn execute(&self, plan: &QueryPlan) -> EngineResult<RowSet>;

    fn applies_pagination(&self) -> bool {
        false
    }
}

impl<E: ExecutionEngine + ?Sized> ExecutionEngine for &E {
    fn execute(&self, plan: &QueryPlan) -> EngineResult<RowSet> {
        (**self).execute(plan)
    }

    fn applies_pagination(&self) -> bool {
        (**self).applies_pagination()
    }
}

/// A scalar result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Rows returned by an engine, column names in output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Every cell of the named column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().filter_map(|r| r.get(index)).collect())
    }

    /// Rows `[offset, offset + limit)`; `None` keeps everything after `offset`.
    pub fn paginate(self, offset: u64, limit: Option<u64>) -> RowSet {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        RowSet {
            rows: self.rows.into_iter().skip(offset).take(limit).collect(),
            columns: self.columns,
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| serde_json::to_value(v).unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}
