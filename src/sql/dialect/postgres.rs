//! PostgreSQL dialect.

use super::helpers;
use super::SqlDialect;

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    /// `strpos` only accepts text, so non-text dimensions are cast first.
    fn contains(&self, haystack: &str, needle: &str) -> String {
        format!("strpos({}, {}) > 0", helpers::cast_text(haystack), needle)
    }
}
