//! Table registry: loads tables from a [`TableSource`] and namespaces them.
//!
//! The registry never mutates its source. Loading the same table twice yields
//! equal [`Table`]s.

mod memory;

pub use memory::InMemorySource;

use thiserror::Error;
use tracing::debug;

use crate::model::table::{SourceColumn, Table, DEFAULT_BOOKKEEPING_PREFIX};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("table '{0}' not found in source")]
    TableNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("table source error: {0}")]
    Source(String),
}

/// Anything that can describe the physical columns of a named table.
///
/// `Ok(None)` means the source has no such table.
pub trait TableSource {
    fn table_columns(&self, name: &str) -> Result<Option<Vec<SourceColumn>>, RegistryError>;
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn table_columns(&self, name: &str) -> Result<Option<Vec<SourceColumn>>, RegistryError> {
        (**self).table_columns(name)
    }
}

/// Loads and namespaces tables.
#[derive(Debug, Clone)]
pub struct TableRegistry<S> {
    source: S,
    bookkeeping_prefix: String,
}

impl<S: TableSource> TableRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            bookkeeping_prefix: DEFAULT_BOOKKEEPING_PREFIX.to_string(),
        }
    }

    /// Override the prefix of columns that are dropped on load.
    pub fn with_bookkeeping_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bookkeeping_prefix = prefix.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load `name` and namespace its columns as `{name}__{column}`.
    pub fn load_table(&self, name: &str) -> Result<Table, RegistryError> {
        let columns = self
            .source
            .table_columns(name)?
            .ok_or_else(|| RegistryError::TableNotFound(name.to_string()))?;

        let table = Table::namespace(name, columns, &self.bookkeeping_prefix);
        debug!(table = name, columns = table.columns.len(), "loaded table");
        Ok(table)
    }
}
