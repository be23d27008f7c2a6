//! SQLite dialect.
//!
//! SQLite has no boolean type (`1`/`0`) and cannot express an OFFSET without a
//! LIMIT, so an unlimited page is written as `LIMIT -1`.

use super::helpers;
use super::SqlDialect;

#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (None, Some(offset)) => format!("LIMIT -1 OFFSET {}", offset),
            _ => helpers::limit_offset_standard(limit, offset),
        }
    }

    fn contains(&self, haystack: &str, needle: &str) -> String {
        format!("instr({}, {}) > 0", haystack, needle)
    }
}
