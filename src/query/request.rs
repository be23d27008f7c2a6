//! Query requests as clients send them.
//!
//! ```json
//! {
//!   "measures": ["totalRevenue"],
//!   "dimensions": ["dim_customer.country"],
//!   "filters": [{"field": "currencycode", "operator": "=", "value": "USD"}],
//!   "timeDimensions": [
//!     {"dimension": "orderdate", "granularity": "month", "dateRange": ["2024-01-01", "2024-03-31"]}
//!   ],
//!   "order": {"totalRevenue": "desc", "country": "asc"},
//!   "limit": 100,
//!   "offset": 0
//! }
//! ```
//!
//! `limit` defaults to 500 and `offset` to 0. An explicit `"limit": null` (or 0)
//! means no limit. `order` is an object; its key order is the sort priority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 500;

fn default_limit() -> Option<u64> {
    Some(DEFAULT_LIMIT)
}

fn default_offset() -> Option<u64> {
    Some(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub measures: Vec<String>,

    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default)]
    pub filters: Vec<FilterCondition>,

    #[serde(default)]
    pub time_dimensions: Vec<TimeDimension>,

    #[serde(default = "default_limit")]
    pub limit: Option<u64>,

    #[serde(default = "default_offset")]
    pub offset: Option<u64>,

    #[serde(default, with = "order_map")]
    pub order: Vec<OrderBy>,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            measures: Vec::new(),
            dimensions: Vec::new(),
            filters: Vec::new(),
            time_dimensions: Vec::new(),
            limit: default_limit(),
            offset: default_offset(),
            order: Vec::new(),
        }
    }
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn measure(mut self, name: impl Into<String>) -> Self {
        self.measures.push(name.into());
        self
    }

    pub fn dimension(mut self, name: impl Into<String>) -> Self {
        self.dimensions.push(name.into());
        self
    }

    pub fn filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn time_dimension(mut self, time_dimension: TimeDimension) -> Self {
        self.time_dimensions.push(time_dimension);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

// =============================================================================
// Filters
// =============================================================================

fn default_operator() -> String {
    "=".to_string()
}

/// A single filter. Filters of a request are combined with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,

    /// Kept as text so an unsupported operator fails only its own request.
    #[serde(default = "default_operator")]
    pub operator: String,

    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: &str, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator: operator.to_string(),
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, "=", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "contains")]
    Contains,
}

impl FilterOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Lt => "<",
            FilterOperator::LtEq => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::GtEq => ">=",
            FilterOperator::Contains => "contains",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" | "equals" => Ok(FilterOperator::Eq),
            "!=" | "<>" | "notEquals" => Ok(FilterOperator::NotEq),
            "<" | "lt" => Ok(FilterOperator::Lt),
            "<=" | "lte" => Ok(FilterOperator::LtEq),
            ">" | "gt" => Ok(FilterOperator::Gt),
            ">=" | "gte" => Ok(FilterOperator::GtEq),
            "contains" => Ok(FilterOperator::Contains),
            other => Err(other.to_string()),
        }
    }
}

/// A scalar filter operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Int(i) => write!(f, "{}", i),
            FilterValue::Float(v) => write!(f, "{}", v),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

// =============================================================================
// Time dimensions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Either an explicit `[start, end]` pair or a relative phrase (`"last 7 days"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRange {
    Literal(Vec<String>),
    Relative(String),
}

impl DateRange {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange::Literal(vec![start.into(), end.into()])
    }

    /// The inclusive bounds, when the range is a two-element literal.
    pub fn bounds(&self) -> Option<(&str, &str)> {
        match self {
            DateRange::Literal(values) => match values.as_slice() {
                [start, end] => Some((start.as_str(), end.as_str())),
                _ => None,
            },
            DateRange::Relative(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDimension {
    pub dimension: String,
    pub granularity: Granularity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl TimeDimension {
    pub fn new(dimension: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            dimension: dimension.into(),
            granularity,
            date_range: None,
        }
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// `order` travels as a JSON object; entries keep their document order.
mod order_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::{OrderBy, SortDirection};

    pub fn serialize<S: Serializer>(order: &[OrderBy], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(order.len()))?;
        for entry in order {
            map.serialize_entry(&entry.field, &entry.direction)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderBy>, D::Error> {
        deserializer.deserialize_option(OptionalOrderVisitor)
    }

    struct OptionalOrderVisitor;

    impl<'de> Visitor<'de> for OptionalOrderVisitor {
        type Value = Vec<OrderBy>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping field names to \"asc\" or \"desc\"")
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_map(OrderVisitor)
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            OrderVisitor.visit_map(map)
        }
    }

    struct OrderVisitor;

    impl<'de> Visitor<'de> for OrderVisitor {
        type Value = Vec<OrderBy>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping field names to \"asc\" or \"desc\"")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut order = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((field, direction)) = map.next_entry::<String, SortDirection>()? {
                order.push(OrderBy { field, direction });
            }
            Ok(order)
        }
    }
}
