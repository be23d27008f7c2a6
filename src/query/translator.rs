//! Request → plan compilation.
//!
//! Field references are matched on their last `.`-separated segment. Names that
//! do not resolve are logged and dropped; the request only fails when nothing
//! selectable is left or a filter cannot be expressed.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::plan::{OutputField, PlanShape, Predicate, QueryPlan, SortKey};
use super::request::{
    DateRange, FilterCondition, FilterOperator, FilterValue, QueryRequest, TimeDimension,
};
use crate::model::catalog::CatalogEntry;
use crate::semantic::error::{QueryError, QueryResult};
use crate::semantic::model::{field_name, SemanticModel};

/// Compiles requests against one model. Cheap to create; holds no state.
#[derive(Debug, Clone, Copy)]
pub struct QueryTranslator<'m> {
    model: &'m SemanticModel,
}

impl<'m> QueryTranslator<'m> {
    pub fn new(model: &'m SemanticModel) -> Self {
        Self { model }
    }

    pub fn translate(&self, request: &QueryRequest) -> QueryResult<QueryPlan> {
        let measures = self.select(&request.measures, |name| self.model.measure(name), "measure");
        let dimensions =
            self.select(&request.dimensions, |name| self.model.dimension(name), "dimension");

        let shape = match (measures.is_empty(), dimensions.is_empty()) {
            (false, false) => PlanShape::Grouped,
            (false, true) => PlanShape::Aggregate,
            (true, false) => PlanShape::Distinct,
            (true, true) => return Err(QueryError::EmptySelection),
        };

        let mut predicates = Vec::new();
        let mut having = Vec::new();
        for filter in &request.filters {
            self.add_filter(filter, shape, &mut predicates, &mut having)?;
        }
        for time_dimension in &request.time_dimensions {
            self.add_time_range(time_dimension, &mut predicates);
        }

        let selected: HashSet<&str> = dimensions
            .iter()
            .chain(measures.iter())
            .map(|f| f.name.as_str())
            .collect();
        let mut order_by: Vec<SortKey> = Vec::new();
        for order in &request.order {
            let name = field_name(&order.field);
            if !selected.contains(name) {
                warn!(field = %order.field, "order key is not a selected field, ignoring");
            } else if order_by.iter().any(|k| k.name == name) {
                debug!(field = %order.field, "duplicate order key ignored");
            } else {
                order_by.push(SortKey {
                    name: name.to_string(),
                    direction: order.direction,
                });
            }
        }

        let plan = QueryPlan {
            relation: self.model.relation.clone(),
            shape,
            dimensions,
            measures,
            predicates,
            having,
            order_by,
            limit: request.limit.filter(|limit| *limit > 0),
            offset: request.offset.unwrap_or(0),
        };

        debug!(
            shape = ?plan.shape,
            columns = ?plan.output_columns(),
            predicates = plan.predicates.len(),
            having = plan.having.len(),
            limit = ?plan.limit,
            offset = plan.offset,
            "translated query"
        );
        Ok(plan)
    }

    /// Resolve requested names of one kind, dropping misses and repeats.
    fn select<F>(&self, fields: &[String], lookup: F, kind: &str) -> Vec<OutputField>
    where
        F: Fn(&str) -> Option<&'m CatalogEntry>,
    {
        let mut selected: Vec<OutputField> = Vec::new();
        for field in fields {
            let name = field_name(field);
            match lookup(name) {
                Some(entry) if selected.iter().any(|f| f.name == entry.name) => {
                    debug!(field = %field, kind, "duplicate field ignored");
                }
                Some(entry) => selected.push(OutputField {
                    name: entry.name.clone(),
                    expr: entry.expr.clone(),
                }),
                None => warn!(field = %field, kind, "unknown field, ignoring"),
            }
        }
        selected
    }

    fn add_filter(
        &self,
        filter: &FilterCondition,
        shape: PlanShape,
        predicates: &mut Vec<Predicate>,
        having: &mut Vec<Predicate>,
    ) -> QueryResult<()> {
        let Some(entry) = self.model.resolve(&filter.field) else {
            warn!(field = %filter.field, "filter on unknown field, ignoring");
            return Ok(());
        };

        let op: FilterOperator =
            filter
                .operator
                .parse()
                .map_err(|operator| QueryError::UnsupportedOperator {
                    field: filter.field.clone(),
                    operator,
                })?;

        if op == FilterOperator::Contains && !matches!(filter.value, FilterValue::Text(_)) {
            return Err(QueryError::InvalidFilter {
                field: filter.field.clone(),
                reason: "'contains' needs a string value".to_string(),
            });
        }

        let predicate = Predicate {
            field: entry.name.clone(),
            expr: entry.expr.clone(),
            op,
            value: filter.value.clone(),
        };

        if !entry.is_measure() {
            predicates.push(predicate);
        } else if op == FilterOperator::Contains {
            return Err(QueryError::InvalidFilter {
                field: filter.field.clone(),
                reason: "'contains' cannot be applied to a measure".to_string(),
            });
        } else if shape == PlanShape::Distinct {
            warn!(
                field = %filter.field,
                "measure filter on a query without measures, ignoring"
            );
        } else {
            having.push(predicate);
        }
        Ok(())
    }

    fn add_time_range(&self, time_dimension: &TimeDimension, predicates: &mut Vec<Predicate>) {
        let Some(entry) = self.model.dimension(field_name(&time_dimension.dimension)) else {
            warn!(
                dimension = %time_dimension.dimension,
                "time dimension is not a known dimension, ignoring"
            );
            return;
        };

        match time_dimension.date_range.as_ref() {
            None => {}
            Some(range) => match range.bounds() {
                Some((start, end)) => {
                    for (op, bound) in [(FilterOperator::GtEq, start), (FilterOperator::LtEq, end)] {
                        predicates.push(Predicate {
                            field: entry.name.clone(),
                            expr: entry.expr.clone(),
                            op,
                            value: FilterValue::Text(bound.to_string()),
                        });
                    }
                }
                None => {
                    let range = match range {
                        DateRange::Relative(phrase) => phrase.clone(),
                        DateRange::Literal(values) => values.join(", "),
                    };
                    warn!(
                        dimension = %entry.name,
                        range = %range,
                        "date range is not a [start, end] pair, not applied"
                    );
                }
            },
        }

        debug!(
            dimension = %entry.name,
            granularity = ?time_dimension.granularity,
            "time dimension granularity does not affect grouping"
        );
    }
}
