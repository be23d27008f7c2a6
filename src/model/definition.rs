//! TOML model definitions.
//!
//! A definition file declares the root table, the references between tables and
//! each table's dimensions and measures. Expressions are written as SQL-like
//! strings and parsed into [`Expr`](crate::model::expr::Expr) trees.
//!
//! ```toml
//! root = "fact_sales"
//!
//! [[references]]
//! table = "fact_sales"
//! referenced_table = "dim_customer"
//! columns = ["customer_key"]
//! referenced_columns = ["customer_key"]
//!
//! [tables.fact_sales.dimensions]
//! orderdate = "order_date"
//!
//! [tables.fact_sales.measures]
//! totalRevenue = "sum(unit_price * quantity)"
//! profit = { expr = "sum(net_price - unit_cost * quantity)", description = "Net minus cost" }
//!
//! [tables.dim_customer.dimensions]
//! country = "country_full"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::catalog::{Catalog, CatalogEntry, TableCatalog};
use crate::model::expr::Expr;
use crate::model::expr_parser::{parse_expr, ParseError};
use crate::model::references::{RelationshipGraph, TableReference};

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Failed to read model definition: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse model definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid expression for '{entry}' on table '{table}': {source}")]
    Expression {
        table: String,
        entry: String,
        #[source]
        source: ParseError,
    },
}

/// Root of a model definition file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelDefinition {
    /// Fact table the model is anchored on.
    pub root: String,

    #[serde(default)]
    pub references: Vec<ReferenceDefinition>,

    /// Per-table catalogs. Every table listed here is declared in the graph.
    #[serde(default)]
    pub tables: BTreeMap<String, TableDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReferenceDefinition {
    pub table: String,
    pub referenced_table: String,
    pub columns: Vec<String>,
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TableDefinition {
    #[serde(default)]
    pub dimensions: BTreeMap<String, EntryDefinition>,

    #[serde(default)]
    pub measures: BTreeMap<String, EntryDefinition>,
}

/// A catalog entry: either a bare expression or an expression with a description.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EntryDefinition {
    Expr(String),
    Detailed {
        expr: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl EntryDefinition {
    pub fn expr(&self) -> &str {
        match self {
            EntryDefinition::Expr(expr) => expr,
            EntryDefinition::Detailed { expr, .. } => expr,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            EntryDefinition::Expr(_) => None,
            EntryDefinition::Detailed { description, .. } => description.as_deref(),
        }
    }
}

impl ModelDefinition {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the relationship graph.
    ///
    /// The root is declared first, then the tables named by references in
    /// reference order, then any remaining catalog tables in name order.
    pub fn relationship_graph(&self) -> RelationshipGraph {
        let mut graph = RelationshipGraph::new().with_table(&self.root);
        for reference in &self.references {
            let columns: Vec<&str> = reference.columns.iter().map(String::as_str).collect();
            let referenced: Vec<&str> = reference
                .referenced_columns
                .iter()
                .map(String::as_str)
                .collect();
            graph = graph.with_reference(TableReference::new(
                &reference.table,
                &reference.referenced_table,
                &columns,
                &referenced,
            ));
        }
        for reference in &self.references {
            graph = graph.with_table(&reference.referenced_table);
        }
        for table in self.tables.keys() {
            graph = graph.with_table(table);
        }
        graph
    }

    /// Parse every entry into a catalog.
    pub fn catalog(&self) -> Result<Catalog, DefinitionError> {
        let mut catalog = Catalog::new();
        for (table, definition) in &self.tables {
            let mut tc = TableCatalog::new(table);
            for (name, entry) in &definition.dimensions {
                tc = tc.with_entry(build_entry(table, name, entry, CatalogEntry::dimension)?);
            }
            for (name, entry) in &definition.measures {
                tc = tc.with_entry(build_entry(table, name, entry, CatalogEntry::measure)?);
            }
            catalog.insert(tc);
        }
        Ok(catalog)
    }
}

fn build_entry(
    table: &str,
    name: &str,
    definition: &EntryDefinition,
    make: fn(&str, &str, Expr) -> CatalogEntry,
) -> Result<CatalogEntry, DefinitionError> {
    let expr = parse_expr(definition.expr(), table).map_err(|source| DefinitionError::Expression {
        table: table.to_string(),
        entry: name.to_string(),
        source,
    })?;
    let entry = make(table, name, expr);
    Ok(match definition.description() {
        Some(description) => entry.with_description(description),
        None => entry,
    })
}
