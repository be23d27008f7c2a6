//! Relationship graph: which table references which, and through which columns.
//!
//! The graph is static configuration. It is validated lazily, by the model
//! assembler, via [`RelationshipGraph::validate`].

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};

use crate::semantic::error::{ModelError, ModelResult};

/// A foreign-key style link from one table to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReference {
    pub referencing_table: String,
    pub referenced_table: String,
    /// Columns on the referencing table
    pub columns: Vec<String>,
    /// Columns on the referenced table, pairwise with `columns`
    pub referenced_columns: Vec<String>,
}

impl TableReference {
    pub fn new(
        referencing_table: &str,
        referenced_table: &str,
        columns: &[&str],
        referenced_columns: &[&str],
    ) -> Self {
        Self {
            referencing_table: referencing_table.into(),
            referenced_table: referenced_table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// `(local, referenced)` column pairs.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.referenced_columns.iter().map(String::as_str))
    }

    fn check_columns(&self) -> ModelResult<()> {
        let message = if self.columns.is_empty() {
            Some("a reference needs at least one column".to_string())
        } else if self.columns.len() != self.referenced_columns.len() {
            Some(format!(
                "{} local columns but {} referenced columns",
                self.columns.len(),
                self.referenced_columns.len()
            ))
        } else {
            None
        };

        match message {
            Some(message) => Err(ModelError::InvalidReference {
                from: self.referencing_table.clone(),
                to: self.referenced_table.clone(),
                message,
            }),
            None => Ok(()),
        }
    }
}

/// Declared tables and their outgoing references.
///
/// Tables keep their declaration order; so do the references of each table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipGraph {
    tables: Vec<String>,
    references: HashMap<String, Vec<TableReference>>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table (with no outgoing references yet).
    pub fn with_table(mut self, name: &str) -> Self {
        self.declare(name);
        self
    }

    /// Add a reference, declaring its referencing table if needed.
    pub fn with_reference(mut self, reference: TableReference) -> Self {
        self.declare(&reference.referencing_table);
        self.references
            .entry(reference.referencing_table.clone())
            .or_default()
            .push(reference);
        self
    }

    fn declare(&mut self, name: &str) {
        if !self.references.contains_key(name) {
            self.tables.push(name.to_string());
            self.references.insert(name.to_string(), Vec::new());
        }
    }

    /// Declared tables, in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.references.contains_key(table)
    }

    /// Outgoing references of a table (empty for undeclared tables).
    pub fn references_from(&self, table: &str) -> &[TableReference] {
        self.references
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every declared table with its outgoing references, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = (&str, &[TableReference])> {
        self.tables
            .iter()
            .map(|t| (t.as_str(), self.references_from(t)))
    }

    /// Check the graph is usable from `root`.
    ///
    /// - `root` is declared
    /// - every reference pairs an equal, non-zero number of columns
    /// - no table can reach itself
    /// - every declared table is reachable from `root`
    ///
    /// References to undeclared tables are left to the assembler, which reports
    /// them as unresolved.
    pub fn validate(&self, root: &str) -> ModelResult<()> {
        if !self.contains(root) {
            return Err(ModelError::UnknownRoot(root.to_string()));
        }

        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for table in &self.tables {
            node_for(&mut graph, &mut nodes, table);
        }
        for (table, references) in self.references() {
            for reference in references {
                reference.check_columns()?;
                let from = node_for(&mut graph, &mut nodes, table);
                let to = node_for(&mut graph, &mut nodes, &reference.referenced_table);
                graph.add_edge(from, to, ());
            }
        }

        for component in tarjan_scc(&graph) {
            let self_loop = component.len() == 1
                && graph.find_edge(component[0], component[0]).is_some();
            if component.len() > 1 || self_loop {
                let mut cycle: Vec<String> =
                    component.iter().map(|i| graph[*i].to_string()).collect();
                cycle.reverse();
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                return Err(ModelError::CyclicReferences(cycle));
            }
        }

        let root_index = nodes
            .get(root)
            .copied()
            .ok_or_else(|| ModelError::UnknownRoot(root.to_string()))?;
        let mut reached = vec![false; graph.node_count()];
        let mut dfs = Dfs::new(&graph, root_index);
        while let Some(visited) = dfs.next(&graph) {
            reached[visited.index()] = true;
        }

        if let Some(unreached) = graph
            .node_indices()
            .find(|i| !reached[i.index()] && self.contains(graph[*i]))
        {
            return Err(ModelError::UnreachableTable {
                table: graph[unreached].to_string(),
                root: root.to_string(),
            });
        }

        Ok(())
    }
}

fn node_for<'a>(
    graph: &mut DiGraph<&'a str, ()>,
    nodes: &mut HashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *nodes.entry(name).or_insert_with(|| graph.add_node(name))
}
