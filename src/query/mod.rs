//! Declarative requests and their translation into query plans.

pub mod plan;
pub mod request;
pub mod translator;

pub use plan::{OutputField, PlanShape, Predicate, QueryPlan, SortKey};
pub use request::{
    DateRange, FilterCondition, FilterOperator, FilterValue, Granularity, OrderBy, QueryRequest,
    SortDirection, TimeDimension, DEFAULT_LIMIT,
};
pub use translator::QueryTranslator;
