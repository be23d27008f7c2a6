// src/model/table.rs
use serde::{Deserialize, Serialize};

/// Separator between the owning table name and the original column name.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// Prefix of loader bookkeeping columns (load ids, row ids).
pub const DEFAULT_BOOKKEEPING_PREFIX: &str = "_dlt_";

/// Build the globally unique name of a column: `{table}__{column}`.
pub fn namespaced(table: &str, column: &str) -> String {
    format!("{}{}{}", table, NAMESPACE_SEPARATOR, column)
}

/// Declared type of a column, as reported by the table source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    Timestamp,
    #[default]
    Unknown,
}

impl ColumnType {
    /// Map a declared SQL type name onto a column type.
    ///
    /// Follows SQLite's affinity rules loosely: the first matching substring wins.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("TIMESTAMP") || upper.contains("DATETIME") {
            ColumnType::Timestamp
        } else if upper.contains("DATE") {
            ColumnType::Date
        } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
            ColumnType::Text
        } else if upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("DEC")
            || upper.contains("NUM")
        {
            ColumnType::Float
        } else {
            ColumnType::Unknown
        }
    }
}

/// A column as the table source reports it, before namespacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,
    pub data_type: ColumnType,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A namespaced column of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Namespaced name (`{table}__{source_name}`)
    pub name: String,
    /// Name of the physical column in the source table
    pub source_name: String,
    pub data_type: ColumnType,
}

/// A loaded table: the physical name plus its namespaced columns, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Namespace a source table.
    ///
    /// Columns whose name starts with `bookkeeping_prefix` are dropped; every other
    /// column is renamed to `{name}__{column}`. An empty prefix drops nothing.
    pub fn namespace(
        name: &str,
        columns: impl IntoIterator<Item = SourceColumn>,
        bookkeeping_prefix: &str,
    ) -> Self {
        let columns = columns
            .into_iter()
            .filter(|c| bookkeeping_prefix.is_empty() || !c.name.starts_with(bookkeeping_prefix))
            .map(|c| Column {
                name: namespaced(name, &c.name),
                source_name: c.name,
                data_type: c.data_type,
            })
            .collect();

        Self {
            name: name.to_string(),
            columns,
        }
    }

    /// Look up a column by its namespaced name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by its source (un-namespaced) name.
    pub fn source_column(&self, source_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.source_name == source_name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
