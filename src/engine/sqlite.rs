//! SQLite-backed table source and execution engine.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::{EngineError, EngineResult, ExecutionEngine, RowSet, Value};
use crate::model::table::{ColumnType, SourceColumn};
use crate::query::plan::QueryPlan;
use crate::registry::{RegistryError, TableSource};
use crate::sql::Dialect;

/// A SQLite database acting as both the loaded-table store and the engine.
///
/// The connection is guarded by a mutex; concurrent requests run one at a time.
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run one or more statements, e.g. to create and seed tables.
    pub fn execute_batch(&self, sql: &str) -> EngineResult<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    /// Borrow the underlying connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> EngineResult<T> {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EngineError::Poisoned)
    }
}

impl ExecutionEngine for SqliteEngine {
    fn execute(&self, plan: &QueryPlan) -> EngineResult<RowSet> {
        let sql = plan.to_sql(Dialect::Sqlite);
        debug!(sql = %sql, "executing query");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut result = RowSet::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(to_value(row.get_ref(i)?));
            }
            result.push_row(values);
        }

        info!(rows = result.len(), "query executed");
        Ok(result)
    }

    fn applies_pagination(&self) -> bool {
        true
    }
}

impl TableSource for SqliteEngine {
    fn table_columns(&self, name: &str) -> Result<Option<Vec<SourceColumn>>, RegistryError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RegistryError::Source("connection lock was poisoned".to_string()))?;

        let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![name], |row| {
                let column: String = row.get(0)?;
                let declared: String = row.get(1)?;
                Ok(SourceColumn::new(column, ColumnType::from_declared(&declared)))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(columns))
        }
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
