//! Parsing client requests.

use starlayer::query::{
    DateRange, FilterCondition, FilterOperator, FilterValue, Granularity, OrderBy, QueryRequest,
    SortDirection, TimeDimension, DEFAULT_LIMIT,
};

#[test]
fn test_full_request() {
    let request = QueryRequest::from_json(
        r#"{
            "measures": ["totalRevenue", "sales.orderCount"],
            "dimensions": ["dim_customer.country"],
            "filters": [
                {"field": "currencycode", "operator": "=", "value": "USD"},
                {"field": "age", "operator": ">=", "value": 30},
                {"field": "exchangerate", "operator": "<", "value": 0.95},
                {"field": "workingday", "value": true}
            ],
            "timeDimensions": [
                {"dimension": "orderdate", "granularity": "month", "dateRange": ["2023-02-01", "2023-02-28"]}
            ],
            "order": {"totalRevenue": "desc", "country": "asc"},
            "limit": 10,
            "offset": 20
        }"#,
    )
    .unwrap();

    assert_eq!(request.measures, vec!["totalRevenue", "sales.orderCount"]);
    assert_eq!(request.dimensions, vec!["dim_customer.country"]);
    assert_eq!(
        request.filters,
        vec![
            FilterCondition::equals("currencycode", "USD"),
            FilterCondition::new("age", ">=", 30_i64),
            FilterCondition::new("exchangerate", "<", 0.95),
            FilterCondition::equals("workingday", true),
        ]
    );
    assert_eq!(
        request.time_dimensions,
        vec![TimeDimension::new("orderdate", Granularity::Month)
            .with_date_range(DateRange::between("2023-02-01", "2023-02-28"))]
    );
    assert_eq!(request.limit, Some(10));
    assert_eq!(request.offset, Some(20));
}

#[test]
fn test_order_keeps_document_order() {
    let request = QueryRequest::from_json(
        r#"{"order": {"totalRevenue": "desc", "country": "asc", "brand": "desc"}}"#,
    )
    .unwrap();
    assert_eq!(
        request.order,
        vec![
            OrderBy {
                field: "totalRevenue".to_string(),
                direction: SortDirection::Desc
            },
            OrderBy {
                field: "country".to_string(),
                direction: SortDirection::Asc
            },
            OrderBy {
                field: "brand".to_string(),
                direction: SortDirection::Desc
            },
        ]
    );
}

#[test]
fn test_order_may_be_null() {
    let request = QueryRequest::from_json(r#"{"order": null}"#).unwrap();
    assert!(request.order.is_empty());
}

#[test]
fn test_bad_sort_direction() {
    assert!(QueryRequest::from_json(r#"{"order": {"country": "sideways"}}"#).is_err());
}

#[test]
fn test_pagination_defaults() {
    let request = QueryRequest::from_json("{}").unwrap();
    assert_eq!(request.limit, Some(DEFAULT_LIMIT));
    assert_eq!(request.offset, Some(0));
    assert_eq!(request, QueryRequest::new());
}

#[test]
fn test_null_limit_means_unlimited() {
    let request = QueryRequest::from_json(r#"{"limit": null}"#).unwrap();
    assert_eq!(request.limit, None);
}

#[test]
fn test_negative_limit_is_rejected() {
    assert!(QueryRequest::from_json(r#"{"limit": -1}"#).is_err());
}

#[test]
fn test_relative_date_range() {
    let request = QueryRequest::from_json(
        r#"{"timeDimensions": [{"dimension": "orderdate", "granularity": "day", "dateRange": "last 7 days"}]}"#,
    )
    .unwrap();
    let range = request.time_dimensions[0].date_range.as_ref().unwrap();
    assert_eq!(range, &DateRange::Relative("last 7 days".to_string()));
    assert_eq!(range.bounds(), None);
}

#[test]
fn test_operator_spellings() {
    let cases = [
        ("=", FilterOperator::Eq),
        ("equals", FilterOperator::Eq),
        ("!=", FilterOperator::NotEq),
        ("<>", FilterOperator::NotEq),
        ("notEquals", FilterOperator::NotEq),
        ("lt", FilterOperator::Lt),
        ("<=", FilterOperator::LtEq),
        ("gt", FilterOperator::Gt),
        ("gte", FilterOperator::GtEq),
        ("contains", FilterOperator::Contains),
    ];
    for (text, expected) in cases {
        assert_eq!(text.parse::<FilterOperator>(), Ok(expected), "{text}");
    }
    assert_eq!("like".parse::<FilterOperator>(), Err("like".to_string()));
}

#[test]
fn test_unknown_operator_still_parses() {
    let request = QueryRequest::from_json(
        r#"{"filters": [{"field": "brand", "operator": "like", "value": "Con%"}]}"#,
    )
    .unwrap();
    assert_eq!(request.filters[0].operator, "like");
    assert_eq!(request.filters[0].value, FilterValue::Text("Con%".to_string()));
}

#[test]
fn test_request_serializes_back() {
    let request = QueryRequest::new()
        .measure("totalRevenue")
        .dimension("country")
        .order_by("totalRevenue", SortDirection::Desc)
        .limit(Some(5));
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["order"], serde_json::json!({"totalRevenue": "desc"}));
    assert_eq!(json["limit"], 5);
    assert_eq!(json["timeDimensions"], serde_json::json!([]));
}
