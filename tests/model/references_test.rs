//! Relationship graph validation.

use starlayer::model::contoso;
use starlayer::model::{RelationshipGraph, TableReference};
use starlayer::semantic::ModelError;

fn snowflake() -> RelationshipGraph {
    RelationshipGraph::new()
        .with_reference(TableReference::new("sales", "stores", &["store_key"], &["store_key"]))
        .with_reference(TableReference::new("stores", "regions", &["region_key"], &["region_key"]))
        .with_table("stores")
        .with_table("regions")
}

#[test]
fn test_contoso_graph_is_a_star() {
    let graph = contoso::relationship_graph();
    graph.validate(contoso::ROOT).unwrap();

    let referenced: Vec<&str> = graph
        .references_from(contoso::ROOT)
        .iter()
        .map(|r| r.referenced_table.as_str())
        .collect();
    assert_eq!(
        referenced,
        vec!["dim_customer", "dim_store", "dim_product", "dim_date"]
    );
    for table in &referenced {
        assert!(graph.references_from(table).is_empty());
    }
}

#[test]
fn test_contoso_date_reference_renames_column() {
    let graph = contoso::relationship_graph();
    let date = graph
        .references_from(contoso::ROOT)
        .iter()
        .find(|r| r.referenced_table == "dim_date")
        .unwrap();
    assert_eq!(date.column_pairs().collect::<Vec<_>>(), vec![("order_date", "date")]);
}

#[test]
fn test_snowflake_is_valid() {
    snowflake().validate("sales").unwrap();
}

#[test]
fn test_root_must_be_declared() {
    let err = snowflake().validate("returns").unwrap_err();
    assert!(matches!(err, ModelError::UnknownRoot(root) if root == "returns"));
}

#[test]
fn test_cycle_is_rejected() {
    let graph = RelationshipGraph::new()
        .with_reference(TableReference::new("sales", "a", &["a_key"], &["a_key"]))
        .with_reference(TableReference::new("a", "b", &["b_key"], &["b_key"]))
        .with_reference(TableReference::new("b", "a", &["a_key"], &["a_key"]));

    let err = graph.validate("sales").unwrap_err();
    match err {
        ModelError::CyclicReferences(cycle) => {
            assert!(cycle.contains(&"a".to_string()));
            assert!(cycle.contains(&"b".to_string()));
            assert_eq!(cycle.first(), cycle.last());
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_unreachable_table_is_rejected() {
    let graph = snowflake().with_table("returns");
    let err = graph.validate("sales").unwrap_err();
    assert!(matches!(
        err,
        ModelError::UnreachableTable { table, root } if table == "returns" && root == "sales"
    ));
}

#[test]
fn test_mismatched_reference_columns() {
    let graph = RelationshipGraph::new().with_reference(TableReference::new(
        "sales",
        "dates",
        &["order_date", "ship_date"],
        &["date"],
    ));
    let err = graph.validate("sales").unwrap_err();
    assert!(matches!(err, ModelError::InvalidReference { from, to, .. } if from == "sales" && to == "dates"));
}

#[test]
fn test_reference_needs_columns() {
    let graph =
        RelationshipGraph::new().with_reference(TableReference::new("sales", "dates", &[], &[]));
    assert!(matches!(
        graph.validate("sales"),
        Err(ModelError::InvalidReference { .. })
    ));
}

#[test]
fn test_reference_to_undeclared_table_is_left_to_assembly() {
    let graph = RelationshipGraph::new().with_reference(TableReference::new(
        "sales",
        "ghost",
        &["ghost_key"],
        &["ghost_key"],
    ));
    graph.validate("sales").unwrap();
    assert!(!graph.contains("ghost"));
}
