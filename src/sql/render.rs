//! Plan → SQL.
//!
//! Every table is wrapped in a projection that renames its columns to their
//! namespaced names, so the rest of the statement can refer to columns without
//! qualification:
//!
//! ```text
//! SELECT <dimensions>, <measures>
//! FROM (SELECT "order_key" AS "fact_sales__order_key", ... FROM "fact_sales") AS "fact_sales"
//! LEFT JOIN (SELECT ... FROM "dim_customer") AS "dim_customer"
//!   ON "fact_sales"."fact_sales__customer_key" = "dim_customer"."dim_customer__customer_key"
//! WHERE ...
//! GROUP BY <dimension exprs>
//! HAVING ...
//! ORDER BY <output aliases>
//! LIMIT n OFFSET m
//! ```

use crate::model::expr::{format_float, AggregateFunc, Expr, Literal};
use crate::model::table::Table;
use crate::query::plan::{PlanShape, Predicate, QueryPlan};
use crate::query::request::{FilterOperator, FilterValue, SortDirection};
use crate::semantic::model::JoinKind;
use crate::sql::dialect::{Dialect, SqlDialect};

pub fn render_plan(plan: &QueryPlan, dialect: Dialect) -> String {
    let d = dialect;
    let mut lines = Vec::new();

    let select: Vec<String> = plan
        .dimensions
        .iter()
        .chain(plan.measures.iter())
        .map(|f| format!("{} AS {}", render_expr(&f.expr, d), d.quote_identifier(&f.name)))
        .collect();
    let distinct = if plan.shape == PlanShape::Distinct {
        "DISTINCT "
    } else {
        ""
    };
    lines.push(format!("SELECT {}{}", distinct, select.join(", ")));

    let mut tables = plan.relation.tables.iter();
    if let Some(root) = tables.next() {
        lines.push(format!("FROM {}", table_source(root, d)));
    }
    for (table, join) in tables.zip(plan.relation.joins.iter()) {
        let on: Vec<String> = join
            .on
            .iter()
            .map(|(left, right)| {
                format!(
                    "{}.{} = {}.{}",
                    d.quote_identifier(&join.referencing_table),
                    d.quote_identifier(left),
                    d.quote_identifier(&join.table),
                    d.quote_identifier(right)
                )
            })
            .collect();
        let keyword = match join.kind {
            JoinKind::Left => "LEFT JOIN",
        };
        lines.push(format!(
            "{} {} ON {}",
            keyword,
            table_source(table, d),
            on.join(" AND ")
        ));
    }

    if !plan.predicates.is_empty() {
        lines.push(format!("WHERE {}", conjunction(&plan.predicates, d)));
    }

    if plan.shape == PlanShape::Grouped {
        let keys: Vec<String> = plan
            .dimensions
            .iter()
            .map(|f| render_expr(&f.expr, d))
            .collect();
        lines.push(format!("GROUP BY {}", keys.join(", ")));
    }

    if !plan.having.is_empty() {
        lines.push(format!("HAVING {}", conjunction(&plan.having, d)));
    }

    let offset = Some(plan.offset).filter(|o| *o > 0);
    let paginated = plan.limit.is_some() || offset.is_some();

    if !plan.order_by.is_empty() {
        let keys: Vec<String> = plan
            .order_by
            .iter()
            .map(|k| {
                let direction = match k.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{} {}", d.quote_identifier(&k.name), direction)
            })
            .collect();
        lines.push(format!("ORDER BY {}", keys.join(", ")));
    } else if paginated && d.requires_order_by_for_offset() {
        lines.push("ORDER BY 1".to_string());
    }

    if paginated {
        lines.push(d.emit_limit_offset(plan.limit, offset));
    }

    lines.join("\n")
}

/// `(SELECT "c" AS "t__c", ... FROM "t") AS "t"`
fn table_source(table: &Table, d: Dialect) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            format!(
                "{} AS {}",
                d.quote_identifier(&c.source_name),
                d.quote_identifier(&c.name)
            )
        })
        .collect();
    format!(
        "(SELECT {} FROM {}) AS {}",
        columns.join(", "),
        d.quote_identifier(&table.name),
        d.quote_identifier(&table.name)
    )
}

fn conjunction(predicates: &[Predicate], d: Dialect) -> String {
    predicates
        .iter()
        .map(|p| render_predicate(p, d))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn render_predicate(predicate: &Predicate, d: Dialect) -> String {
    let lhs = render_expr(&predicate.expr, d);
    let rhs = render_value(&predicate.value, d);
    let op = match predicate.op {
        FilterOperator::Eq => "=",
        FilterOperator::NotEq => "<>",
        FilterOperator::Lt => "<",
        FilterOperator::LtEq => "<=",
        FilterOperator::Gt => ">",
        FilterOperator::GtEq => ">=",
        FilterOperator::Contains => return d.contains(&lhs, &rhs),
    };
    format!("{} {} {}", lhs, op, rhs)
}

fn render_value(value: &FilterValue, d: Dialect) -> String {
    match value {
        FilterValue::Bool(b) => d.format_bool(*b).to_string(),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Float(f) => format_float(*f),
        FilterValue::Text(s) => d.quote_string(s),
    }
}

/// Render a catalog expression over namespaced columns.
pub fn render_expr(expr: &Expr, d: Dialect) -> String {
    match expr {
        Expr::Column(name) => d.quote_identifier(name),
        Expr::Literal(lit) => match lit {
            Literal::Null => "NULL".to_string(),
            Literal::Bool(b) => d.format_bool(*b).to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => format_float(*f),
            Literal::String(s) => d.quote_string(s),
        },
        Expr::Binary { left, op, right } => format!(
            "{} {} {}",
            render_operand(left, d),
            op.symbol(),
            render_operand(right, d)
        ),
        Expr::Negate(inner) => format!("-{}", render_operand(inner, d)),
        Expr::Aggregate { func, arg } => {
            let arg = render_expr(arg, d);
            match func {
                AggregateFunc::Sum => format!("SUM({})", arg),
                AggregateFunc::Mean => format!("AVG({})", arg),
                AggregateFunc::CountDistinct => format!("COUNT(DISTINCT {})", arg),
                AggregateFunc::Count => format!("COUNT({})", arg),
                AggregateFunc::Min => format!("MIN({})", arg),
                AggregateFunc::Max => format!("MAX({})", arg),
            }
        }
    }
}

fn render_operand(expr: &Expr, d: Dialect) -> String {
    match expr {
        Expr::Binary { .. } | Expr::Negate(_) => format!("({})", render_expr(expr, d)),
        // `a - -1` would start a line comment
        Expr::Literal(Literal::Int(i)) if *i < 0 => format!("({})", i),
        Expr::Literal(Literal::Float(f)) if *f < 0.0 => format!("({})", format_float(*f)),
        _ => render_expr(expr, d),
    }
}
