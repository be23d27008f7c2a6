//! Model assembly: walk the relationship graph from the root fact table and
//! left-join every referenced table into one relation.
//!
//! ```text
//! validate graph ──► load + namespace every declared table
//!                         │
//!                         ▼
//!                validate each table's catalog
//!                         │
//!                         ▼
//!       depth-first walk from root (declaration order):
//!         referenced table loaded? ── no ──► UnresolvedReference
//!         already consumed?        ── yes ─► MultiplePaths
//!         join columns exist?      ── no ──► UnknownJoinColumn
//!         namespaced column taken? ── yes ─► ColumnCollision
//!         left join, merge catalog ── name clash ─► DuplicateName
//! ```
//!
//! Any failure aborts assembly; no partial model is ever returned.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ModelError, ModelResult};
use super::fingerprint::fingerprint;
use super::model::{JoinKind, JoinSpec, Relation, SemanticModel};
use crate::model::catalog::{Catalog, CatalogEntry, EntryKind, TableCatalog};
use crate::model::references::RelationshipGraph;
use crate::model::table::Table;
use crate::registry::{TableRegistry, TableSource};

/// Builds a [`SemanticModel`] from a relationship graph and hand-authored catalogs.
#[derive(Debug, Clone, Copy)]
pub struct ModelAssembler<'a> {
    graph: &'a RelationshipGraph,
    catalog: &'a Catalog,
    root: &'a str,
}

struct LoadedTable {
    table: Table,
    catalog: TableCatalog,
}

#[derive(Default)]
struct Assembly {
    consumed: HashSet<String>,
    /// Namespaced column -> owning table
    columns: HashMap<String, String>,
    tables: Vec<Table>,
    joins: Vec<JoinSpec>,
    dimensions: BTreeMap<String, CatalogEntry>,
    measures: BTreeMap<String, CatalogEntry>,
}

impl Assembly {
    /// Add a table to the relation; its namespaced columns must be new.
    fn push_table(&mut self, table: &Table) -> ModelResult<()> {
        for column in table.column_names() {
            if let Some(first) = self.columns.get(column) {
                return Err(ModelError::ColumnCollision {
                    column: column.to_string(),
                    first_table: first.clone(),
                    second_table: table.name.clone(),
                });
            }
            self.columns.insert(column.to_string(), table.name.clone());
        }
        self.tables.push(table.clone());
        Ok(())
    }

    fn merge(&mut self, catalog: &TableCatalog) -> ModelResult<()> {
        for entry in catalog.entries() {
            let existing = self
                .dimensions
                .get(&entry.name)
                .or_else(|| self.measures.get(&entry.name));
            if let Some(existing) = existing {
                return Err(ModelError::DuplicateName {
                    name: entry.name.clone(),
                    first_table: existing.table.clone(),
                    second_table: entry.table.clone(),
                });
            }
            let target = match entry.kind {
                EntryKind::Dimension => &mut self.dimensions,
                EntryKind::Measure => &mut self.measures,
            };
            target.insert(entry.name.clone(), entry.clone());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    root: &'a str,
    relation: &'a Relation,
    dimensions: &'a BTreeMap<String, CatalogEntry>,
    measures: &'a BTreeMap<String, CatalogEntry>,
}

impl<'a> ModelAssembler<'a> {
    pub fn new(graph: &'a RelationshipGraph, catalog: &'a Catalog, root: &'a str) -> Self {
        Self {
            graph,
            catalog,
            root,
        }
    }

    pub fn assemble<S: TableSource>(
        &self,
        registry: &TableRegistry<S>,
    ) -> ModelResult<SemanticModel> {
        self.graph.validate(self.root)?;

        for table in self.catalog.tables() {
            if !self.graph.contains(&table.table) {
                warn!(
                    table = %table.table,
                    "catalog table is not part of the relationship graph, ignoring"
                );
            }
        }

        let loaded = self.load_tables(registry)?;

        let root = loaded
            .get(self.root)
            .ok_or_else(|| ModelError::UnknownRoot(self.root.to_string()))?;
        let mut assembly = Assembly::default();
        assembly.consumed.insert(self.root.to_string());
        assembly.push_table(&root.table)?;
        assembly.merge(&root.catalog)?;

        self.join_references(self.root, &loaded, &mut assembly)?;

        let relation = Relation {
            tables: assembly.tables,
            joins: assembly.joins,
        };
        let fingerprint = fingerprint(&FingerprintInput {
            root: self.root,
            relation: &relation,
            dimensions: &assembly.dimensions,
            measures: &assembly.measures,
        })?;

        info!(
            root = self.root,
            tables = relation.tables.len(),
            joins = relation.joins.len(),
            dimensions = assembly.dimensions.len(),
            measures = assembly.measures.len(),
            fingerprint = %&fingerprint[..12],
            "assembled semantic model"
        );

        Ok(SemanticModel {
            root: self.root.to_string(),
            relation,
            dimensions: assembly.dimensions,
            measures: assembly.measures,
            fingerprint,
        })
    }

    /// Load every declared table and check its catalog against the loaded schema.
    fn load_tables<S: TableSource>(
        &self,
        registry: &TableRegistry<S>,
    ) -> ModelResult<HashMap<String, LoadedTable>> {
        let mut loaded = HashMap::new();
        for name in self.graph.tables() {
            let table = registry.load_table(name)?;
            let catalog = self
                .catalog
                .get(name)
                .cloned()
                .unwrap_or_else(|| TableCatalog::new(name));
            catalog.validate(&table)?;

            info!(
                table = name,
                columns = table.columns.len(),
                dimensions = catalog.dimensions.len(),
                measures = catalog.measures.len(),
                "loaded table"
            );
            loaded.insert(name.to_string(), LoadedTable { table, catalog });
        }
        Ok(loaded)
    }

    fn join_references(
        &self,
        current: &str,
        loaded: &HashMap<String, LoadedTable>,
        assembly: &mut Assembly,
    ) -> ModelResult<()> {
        for reference in self.graph.references_from(current) {
            let target = reference.referenced_table.as_str();
            let unresolved = || ModelError::UnresolvedReference {
                from: current.to_string(),
                to: target.to_string(),
            };
            let referencing = loaded.get(current).ok_or_else(unresolved)?;
            let referenced = loaded.get(target).ok_or_else(unresolved)?;

            if !assembly.consumed.insert(target.to_string()) {
                return Err(ModelError::MultiplePaths {
                    table: target.to_string(),
                });
            }

            let mut on = Vec::with_capacity(reference.columns.len());
            for (local, remote) in reference.column_pairs() {
                let left = join_column(&referencing.table, local)?;
                let right = join_column(&referenced.table, remote)?;
                on.push((left, right));
            }

            debug!(from = current, to = target, on = ?on, "left join");
            assembly.joins.push(JoinSpec {
                table: target.to_string(),
                referencing_table: current.to_string(),
                on,
                kind: JoinKind::Left,
            });
            assembly.push_table(&referenced.table)?;
            assembly.merge(&referenced.catalog)?;

            self.join_references(target, loaded, assembly)?;
        }
        Ok(())
    }
}

fn join_column(table: &Table, source_name: &str) -> ModelResult<String> {
    table
        .source_column(source_name)
        .map(|c| c.name.clone())
        .ok_or_else(|| ModelError::UnknownJoinColumn {
            table: table.name.clone(),
            column: source_name.to_string(),
        })
}
