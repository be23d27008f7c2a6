use std::collections::HashMap;

use super::{RegistryError, TableSource};
use crate::model::table::{ColumnType, SourceColumn};

/// A schema-only table source held in memory.
///
/// Useful for validating a model without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<String, Vec<SourceColumn>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, ColumnType)]) -> Self {
        self.insert(
            name,
            columns
                .iter()
                .map(|(column, data_type)| SourceColumn::new(*column, *data_type))
                .collect(),
        );
        self
    }

    pub fn insert(&mut self, name: &str, columns: Vec<SourceColumn>) {
        self.tables.insert(name.to_string(), columns);
    }
}

impl TableSource for InMemorySource {
    fn table_columns(&self, name: &str) -> Result<Option<Vec<SourceColumn>>, RegistryError> {
        Ok(self.tables.get(name).cloned())
    }
}
