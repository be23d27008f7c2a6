//! Translating requests against the Contoso model.

#[path = "../common/mod.rs"]
mod common;

use starlayer::model::col;
use starlayer::query::{
    DateRange, FilterCondition, FilterOperator, FilterValue, Granularity, PlanShape, QueryRequest,
    QueryTranslator, SortDirection, TimeDimension,
};
use starlayer::semantic::QueryError;

#[test]
fn test_grouped_plan() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .dimension("dim_customer.country")
                .dimension("brand"),
        )
        .unwrap();

    assert_eq!(plan.shape, PlanShape::Grouped);
    assert_eq!(plan.output_columns(), vec!["country", "brand", "totalRevenue"]);
    assert_eq!(plan.dimensions[0].expr, col("dim_customer__country_full"));
    assert_eq!(
        plan.measures[0].expr,
        (col("fact_sales__unit_price") * col("fact_sales__quantity")).sum()
    );
    assert_eq!(plan.relation, layer.model().relation);
    assert_eq!(plan.limit, Some(500));
    assert_eq!(plan.offset, 0);
}

#[test]
fn test_unknown_fields_are_dropped() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .measure("grossMargin")
                .dimension("planet")
                .dimension("country"),
        )
        .unwrap();
    assert_eq!(plan.output_columns(), vec!["country", "totalRevenue"]);
}

#[test]
fn test_fields_resolve_within_their_kind() {
    let layer = common::contoso_layer();
    // `country` is a dimension; asking for it as a measure selects nothing.
    let err = layer
        .compile(&QueryRequest::new().measure("country"))
        .unwrap_err();
    assert_eq!(err, QueryError::EmptySelection);
}

#[test]
fn test_duplicates_are_selected_once() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("profit")
                .measure("sales.profit")
                .dimension("year"),
        )
        .unwrap();
    assert_eq!(plan.output_columns(), vec!["year", "profit"]);
}

#[test]
fn test_empty_request() {
    let layer = common::contoso_layer();
    assert_eq!(
        layer.compile(&QueryRequest::new()).unwrap_err(),
        QueryError::EmptySelection
    );
}

#[test]
fn test_dimension_filters_become_predicates() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .filter(FilterCondition::equals("currencycode", "USD"))
                .filter(FilterCondition::new("age", "gte", 30_i64)),
        )
        .unwrap();

    assert_eq!(plan.shape, PlanShape::Aggregate);
    assert!(plan.having.is_empty());
    assert_eq!(plan.predicates.len(), 2);
    assert_eq!(plan.predicates[0].expr, col("fact_sales__currency_code"));
    assert_eq!(plan.predicates[1].op, FilterOperator::GtEq);
    assert_eq!(plan.predicates[1].value, FilterValue::Int(30));
}

#[test]
fn test_measure_filters_become_having() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .dimension("country")
                .filter(FilterCondition::new("orderCount", ">", 2_i64)),
        )
        .unwrap();
    assert!(plan.predicates.is_empty());
    assert_eq!(plan.having.len(), 1);
    assert_eq!(plan.having[0].field, "orderCount");
}

#[test]
fn test_filter_on_unselected_measure_without_measures_is_ignored() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .dimension("country")
                .filter(FilterCondition::new("totalRevenue", ">", 10_i64)),
        )
        .unwrap();
    assert_eq!(plan.shape, PlanShape::Distinct);
    assert!(plan.having.is_empty());
}

#[test]
fn test_filter_on_unknown_field_is_ignored() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .filter(FilterCondition::new("planet", "like", "Mars")),
        )
        .unwrap();
    assert!(plan.predicates.is_empty());
}

#[test]
fn test_unsupported_operator() {
    let layer = common::contoso_layer();
    let err = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .filter(FilterCondition::new("brand", "like", "Con%")),
        )
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::UnsupportedOperator {
            field: "brand".to_string(),
            operator: "like".to_string(),
        }
    );
}

#[test]
fn test_contains_needs_text() {
    let layer = common::contoso_layer();
    let err = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .filter(FilterCondition::new("brand", "contains", 5_i64)),
        )
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { field, .. } if field == "brand"));
}

#[test]
fn test_contains_on_measure_is_rejected() {
    let layer = common::contoso_layer();
    let err = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .filter(FilterCondition::new("totalRevenue", "contains", "1")),
        )
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilter { .. }));
}

#[test]
fn test_time_dimension_range() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new().measure("totalRevenue").time_dimension(
                TimeDimension::new("orderdate", Granularity::Month)
                    .with_date_range(DateRange::between("2023-02-01", "2023-02-28")),
            ),
        )
        .unwrap();

    let bounds: Vec<(FilterOperator, &FilterValue)> =
        plan.predicates.iter().map(|p| (p.op, &p.value)).collect();
    assert_eq!(
        bounds,
        vec![
            (FilterOperator::GtEq, &FilterValue::Text("2023-02-01".to_string())),
            (FilterOperator::LtEq, &FilterValue::Text("2023-02-28".to_string())),
        ]
    );
    assert!(plan
        .predicates
        .iter()
        .all(|p| p.expr == col("fact_sales__order_date")));
    // granularity does not add a group key
    assert_eq!(plan.shape, PlanShape::Aggregate);
}

#[test]
fn test_time_dimension_without_pair_adds_nothing() {
    let layer = common::contoso_layer();
    for range in [
        DateRange::Relative("last month".to_string()),
        DateRange::Literal(vec!["2023-02-01".to_string()]),
    ] {
        let plan = layer
            .compile(
                &QueryRequest::new().measure("totalRevenue").time_dimension(
                    TimeDimension::new("orderdate", Granularity::Day).with_date_range(range),
                ),
            )
            .unwrap();
        assert!(plan.predicates.is_empty());
    }
}

#[test]
fn test_order_keys() {
    let layer = common::contoso_layer();
    let plan = layer
        .compile(
            &QueryRequest::new()
                .measure("totalRevenue")
                .dimension("country")
                .order_by("totalRevenue", SortDirection::Desc)
                .order_by("brand", SortDirection::Asc)
                .order_by("dim_customer.country", SortDirection::Asc)
                .order_by("country", SortDirection::Desc),
        )
        .unwrap();
    let keys: Vec<(&str, SortDirection)> = plan
        .order_by
        .iter()
        .map(|k| (k.name.as_str(), k.direction))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("totalRevenue", SortDirection::Desc),
            ("country", SortDirection::Asc),
        ]
    );
}

#[test]
fn test_pagination() {
    let layer = common::contoso_layer();
    let request = QueryRequest::new().dimension("country");

    let plan = layer.compile(&request.clone().limit(Some(2)).offset(4)).unwrap();
    assert_eq!((plan.limit, plan.offset), (Some(2), 4));

    let plan = layer.compile(&request.clone().limit(None)).unwrap();
    assert_eq!(plan.limit, None);

    let plan = layer.compile(&request.limit(Some(0))).unwrap();
    assert_eq!(plan.limit, None);
}

#[test]
fn test_translation_does_not_touch_model() {
    let layer = common::contoso_layer();
    let before = layer.model().clone();
    let translator = QueryTranslator::new(layer.model());
    for request in [
        QueryRequest::new().measure("totalRevenue"),
        QueryRequest::new().dimension("brand"),
        QueryRequest::new(),
    ] {
        let _ = translator.translate(&request);
    }
    assert_eq!(layer.model(), &before);
}

