//! Shared building blocks for dialect implementations.

// =============================================================================
// Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Booleans
// =============================================================================

/// Used by: Postgres, DuckDB
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Used by: T-SQL, SQLite
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Casts
// =============================================================================

/// `CAST(expr AS VARCHAR)`.
/// Used by: Postgres, DuckDB
pub fn cast_text(expr: &str) -> String {
    format!("CAST({} AS VARCHAR)", expr)
}

// =============================================================================
// Pagination
// =============================================================================

/// `LIMIT n OFFSET m`; either part may be absent.
pub fn limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut parts = Vec::new();
    if let Some(limit) = limit {
        parts.push(format!("LIMIT {}", limit));
    }
    if let Some(offset) = offset {
        parts.push(format!("OFFSET {}", offset));
    }
    parts.join(" ")
}

/// `OFFSET m ROWS [FETCH NEXT n ROWS ONLY]`. Requires an ORDER BY clause.
pub fn limit_offset_tsql(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = format!("OFFSET {} ROWS", offset.unwrap_or(0));
    if let Some(limit) = limit {
        sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
    }
    sql
}
