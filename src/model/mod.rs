//! Static model types: tables, expressions, references and catalogs.

pub mod catalog;
pub mod contoso;
pub mod definition;
pub mod expr;
pub mod expr_parser;
pub mod references;
pub mod table;

pub use catalog::{Catalog, CatalogEntry, EntryKind, TableCatalog};
pub use definition::{DefinitionError, ModelDefinition};
pub use expr::{col, lit_float, lit_int, lit_str, AggregateFunc, BinaryOp, Expr, Literal};
pub use references::{RelationshipGraph, TableReference};
pub use table::{namespaced, Column, ColumnType, SourceColumn, Table};
