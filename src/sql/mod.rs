//! SQL rendering of query plans.
//!
//! - [`dialect`] - per-database syntax differences
//! - [`render`] - plan to SQL text
//! - [`validate`] - sqlparser round-trip checks of rendered SQL

pub mod dialect;
pub mod render;
pub mod validate;

pub use dialect::{Dialect, SqlDialect, UnknownDialect};
pub use render::{render_expr, render_plan};
pub use validate::validate_sql;
