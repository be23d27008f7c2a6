//! The assembled, immutable semantic model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::catalog::{CatalogEntry, EntryKind};
use crate::model::table::Table;

/// Join type between a table and one it references.
///
/// Only left joins are produced: every fact row survives, unmatched dimension
/// columns are null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Left,
}

/// One join of the assembled relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Table being joined in
    pub table: String,
    /// Table already in the relation that references it
    pub referencing_table: String,
    /// Equality pairs of namespaced columns: `(referencing, referenced)`
    pub on: Vec<(String, String)>,
    pub kind: JoinKind,
}

/// The joined relation: the root table followed by every joined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Root first, then tables in join order
    pub tables: Vec<Table>,
    pub joins: Vec<JoinSpec>,
}

impl Relation {
    /// Every namespaced column of the relation.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().flat_map(|t| t.column_names())
    }
}

/// A star schema exposed as one flat namespace of dimensions and measures.
///
/// Built once by [`ModelAssembler`](super::ModelAssembler); never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub root: String,
    pub relation: Relation,
    pub dimensions: BTreeMap<String, CatalogEntry>,
    pub measures: BTreeMap<String, CatalogEntry>,
    /// SHA-256 of the model content
    pub fingerprint: String,
}

impl SemanticModel {
    pub fn list_dimensions(&self) -> Vec<&str> {
        self.dimensions.keys().map(String::as_str).collect()
    }

    pub fn list_measures(&self) -> Vec<&str> {
        self.measures.keys().map(String::as_str).collect()
    }

    pub fn dimension(&self, name: &str) -> Option<&CatalogEntry> {
        self.dimensions.get(name)
    }

    pub fn measure(&self, name: &str) -> Option<&CatalogEntry> {
        self.measures.get(name)
    }

    /// Resolve a request field name.
    ///
    /// Only the last `.`-separated segment is significant, so `sales.totalRevenue`
    /// and `totalRevenue` resolve to the same entry.
    pub fn resolve(&self, field: &str) -> Option<&CatalogEntry> {
        let name = field_name(field);
        self.dimension(name).or_else(|| self.measure(name))
    }

    pub fn describe(&self) -> ModelDescription {
        ModelDescription {
            root: self.root.clone(),
            fingerprint: self.fingerprint.clone(),
            tables: self.relation.tables.iter().map(|t| t.name.clone()).collect(),
            dimensions: self.dimensions.values().map(FieldDescription::from).collect(),
            measures: self.measures.values().map(FieldDescription::from).collect(),
        }
    }
}

/// The last `.`-separated segment of a field reference.
pub fn field_name(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

/// Serializable summary of a model, for clients listing what can be queried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub root: String,
    pub fingerprint: String,
    pub tables: Vec<String>,
    pub dimensions: Vec<FieldDescription>,
    pub measures: Vec<FieldDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    pub title: String,
    pub table: String,
    pub kind: EntryKind,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&CatalogEntry> for FieldDescription {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            title: entry.title(),
            table: entry.table.clone(),
            kind: entry.kind,
            expression: entry.expr.to_string(),
            description: entry.description.clone(),
        }
    }
}
