// src/model/catalog.rs
use std::collections::{HashMap, HashSet};

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::model::expr::{Expr, ExprContext};
use crate::model::table::Table;
use crate::semantic::error::{ModelError, ModelResult};

/// Whether a catalog entry is a row-level dimension or an aggregating measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dimension,
    Measure,
}

impl EntryKind {
    pub fn context(&self) -> ExprContext {
        match self {
            EntryKind::Dimension => ExprContext::Dimension,
            EntryKind::Measure => ExprContext::Measure,
        }
    }
}

/// A named dimension or measure owned by one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Short business-facing name (`totalRevenue`)
    pub name: String,
    /// Owning table
    pub table: String,
    pub kind: EntryKind,
    pub expr: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn dimension(table: &str, name: &str, expr: Expr) -> Self {
        Self::new(table, name, EntryKind::Dimension, expr)
    }

    pub fn measure(table: &str, name: &str, expr: Expr) -> Self {
        Self::new(table, name, EntryKind::Measure, expr)
    }

    fn new(table: &str, name: &str, kind: EntryKind, expr: Expr) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            kind,
            expr,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display title: `totalRevenue` -> `Total Revenue`.
    pub fn title(&self) -> String {
        self.name.to_title_case()
    }

    pub fn is_measure(&self) -> bool {
        self.kind == EntryKind::Measure
    }

    /// Check the entry against its owning table's namespaced schema.
    pub fn validate(&self, table: &Table) -> ModelResult<()> {
        self.expr
            .validate_context(self.kind.context())
            .map_err(|source| ModelError::InvalidExpression {
                table: self.table.clone(),
                entry: self.name.clone(),
                source,
            })?;

        if let Some(missing) = self.expr.columns().into_iter().find(|c| !table.has_column(c)) {
            return Err(ModelError::UnknownColumn {
                table: self.table.clone(),
                entry: self.name.clone(),
                column: missing.to_string(),
            });
        }

        Ok(())
    }
}

/// Dimensions and measures of a single table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCatalog {
    pub table: String,
    pub dimensions: Vec<CatalogEntry>,
    pub measures: Vec<CatalogEntry>,
}

impl TableCatalog {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, name: &str, expr: Expr) -> Self {
        self.dimensions
            .push(CatalogEntry::dimension(&self.table, name, expr));
        self
    }

    pub fn with_measure(mut self, name: &str, expr: Expr) -> Self {
        self.measures
            .push(CatalogEntry::measure(&self.table, name, expr));
        self
    }

    /// Add a pre-built entry; it is re-owned by this table.
    pub fn with_entry(mut self, mut entry: CatalogEntry) -> Self {
        entry.table = self.table.clone();
        match entry.kind {
            EntryKind::Dimension => self.dimensions.push(entry),
            EntryKind::Measure => self.measures.push(entry),
        }
        self
    }

    /// Dimensions first, then measures.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.dimensions.iter().chain(self.measures.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.measures.is_empty()
    }

    /// Validate every entry against the loaded table and reject repeated names.
    pub fn validate(&self, table: &Table) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for entry in self.entries() {
            if !seen.insert(entry.name.as_str()) {
                return Err(ModelError::DuplicateName {
                    name: entry.name.clone(),
                    first_table: self.table.clone(),
                    second_table: self.table.clone(),
                });
            }
            entry.validate(table)?;
        }
        Ok(())
    }
}

/// Hand-authored catalogs, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tables: HashMap<String, TableCatalog>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, catalog: TableCatalog) -> Self {
        self.insert(catalog);
        self
    }

    pub fn insert(&mut self, catalog: TableCatalog) {
        self.tables.insert(catalog.table.clone(), catalog);
    }

    pub fn get(&self, table: &str) -> Option<&TableCatalog> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableCatalog> {
        self.tables.values()
    }
}
