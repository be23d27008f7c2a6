//! TOML model definitions assembled over the Contoso fixture.

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use starlayer::compile::ModelSpec;
use starlayer::engine::Value;
use starlayer::model::table::DEFAULT_BOOKKEEPING_PREFIX;
use starlayer::model::{DefinitionError, EntryKind, ModelDefinition};
use starlayer::query::{QueryRequest, SortDirection};
use starlayer::{SemanticLayer, StarlayerError};

const SALES_BY_COUNTRY: &str = r#"
root = "fact_sales"

[[references]]
table = "fact_sales"
referenced_table = "dim_customer"
columns = ["customer_key"]
referenced_columns = ["customer_key"]

[[references]]
table = "fact_sales"
referenced_table = "dim_date"
columns = ["order_date"]
referenced_columns = ["date"]

[tables.fact_sales.dimensions]
currency = "currency_code"

[tables.fact_sales.measures]
revenue = { expr = "sum(unit_price * quantity)", description = "Gross revenue" }
units = "sum(quantity)"
margin = "sum(net_price) - sum(unit_cost * quantity)"

[tables.dim_customer.dimensions]
country = "country_full"

[tables.dim_date.dimensions]
month = "month"
"#;

fn layer(definition: &str) -> starlayer::Result<SemanticLayer<starlayer::engine::SqliteEngine>> {
    let spec = ModelSpec::from_definition(&ModelDefinition::from_toml_str(definition)?)?;
    SemanticLayer::assemble(&spec, common::contoso_engine(), DEFAULT_BOOKKEEPING_PREFIX)
}

#[test]
fn test_definition_assembles() {
    let layer = layer(SALES_BY_COUNTRY).unwrap();
    let model = layer.model();

    assert_eq!(model.root, "fact_sales");
    assert_eq!(model.list_dimensions(), vec!["country", "currency", "month"]);
    assert_eq!(model.list_measures(), vec!["margin", "revenue", "units"]);
    assert_eq!(
        model.relation.tables.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["fact_sales", "dim_customer", "dim_date"]
    );

    let revenue = model.measure("revenue").unwrap();
    assert_eq!(revenue.kind, EntryKind::Measure);
    assert_eq!(revenue.description.as_deref(), Some("Gross revenue"));
}

#[test]
fn test_definition_queries_like_builtin_model() {
    let defined = layer(SALES_BY_COUNTRY).unwrap();
    let builtin = common::contoso_layer();

    let request = |measure: &str| {
        QueryRequest::new()
            .measure(measure)
            .dimension("country")
            .order_by("country", SortDirection::Asc)
    };
    let ours = defined.query(&request("revenue")).unwrap();
    let theirs = builtin.query(&request("totalRevenue")).unwrap();

    assert_eq!(ours.rows, theirs.rows);
}

#[test]
fn test_measure_combining_aggregates() {
    let layer = layer(SALES_BY_COUNTRY).unwrap();
    let rows = layer.query(&QueryRequest::new().measure("margin")).unwrap();
    assert_eq!(
        rows.get(0, "margin").and_then(Value::as_f64),
        Some(common::TOTAL_REVENUE - common::TOTAL_COST)
    );
}

#[test]
fn test_definition_from_file() {
    let path = std::env::temp_dir().join(format!(
        "starlayer-definition-{}.toml",
        std::process::id()
    ));
    fs::write(&path, SALES_BY_COUNTRY).unwrap();

    let definition = ModelDefinition::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(definition.root, "fact_sales");
    assert_eq!(definition.references.len(), 2);
    assert_eq!(definition.tables.len(), 3);
}

#[test]
fn test_missing_file() {
    let err = ModelDefinition::from_file("/nonexistent/starlayer/model.toml").unwrap_err();
    assert!(matches!(err, DefinitionError::Read(_)));
}

#[test]
fn test_unknown_column_in_definition() {
    let definition = r#"
root = "fact_sales"

[tables.fact_sales.measures]
revenue = "sum(gross_amount)"
"#;
    let err = layer(definition).err().unwrap();
    assert!(
        matches!(
            &err,
            StarlayerError::Model(starlayer::semantic::ModelError::UnknownColumn { column, .. })
                if column == "fact_sales__gross_amount"
        ),
        "{err}"
    );
}

#[test]
fn test_dimension_with_aggregate_is_rejected() {
    let definition = r#"
root = "fact_sales"

[tables.fact_sales.dimensions]
biggest = "max(quantity)"
"#;
    assert!(matches!(
        layer(definition),
        Err(StarlayerError::Model(starlayer::semantic::ModelError::InvalidExpression { .. }))
    ));
}
