//! Expression types for dimensions and measures.
//!
//! Catalog entries are expressed as a small, dialect-agnostic tree rather than
//! opaque closures, so they can be validated against a table schema before any
//! query runs, rendered to SQL, and serialized.

use std::fmt;
use std::ops;

use serde::{Deserialize, Serialize};

// =============================================================================
// Core Expression Type
// =============================================================================

/// Expression over namespaced columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Reference to a namespaced column (`fact_sales__quantity`)
    Column(String),

    /// Literal value
    Literal(Literal),

    /// Arithmetic between two expressions
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Arithmetic negation
    Negate(Box<Expr>),

    /// Aggregate over a row-level expression
    Aggregate { func: AggregateFunc, arg: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunc {
    Sum,
    Mean,
    CountDistinct,
    Count,
    Min,
    Max,
}

impl AggregateFunc {
    /// Name used when displaying expressions (and accepted by the parser).
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Sum => "sum",
            AggregateFunc::Mean => "mean",
            AggregateFunc::CountDistinct => "count_distinct",
            AggregateFunc::Count => "count",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Column reference.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Integer literal.
pub fn lit_int(value: i64) -> Expr {
    Expr::Literal(Literal::Int(value))
}

/// Float literal.
pub fn lit_float(value: f64) -> Expr {
    Expr::Literal(Literal::Float(value))
}

/// String literal.
pub fn lit_str(value: impl Into<String>) -> Expr {
    Expr::Literal(Literal::String(value.into()))
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn aggregate(func: AggregateFunc, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            arg: Box::new(arg),
        }
    }

    pub fn sum(self) -> Self {
        Self::aggregate(AggregateFunc::Sum, self)
    }

    pub fn mean(self) -> Self {
        Self::aggregate(AggregateFunc::Mean, self)
    }

    pub fn count_distinct(self) -> Self {
        Self::aggregate(AggregateFunc::CountDistinct, self)
    }

    pub fn count(self) -> Self {
        Self::aggregate(AggregateFunc::Count, self)
    }

    pub fn min(self) -> Self {
        Self::aggregate(AggregateFunc::Min, self)
    }

    pub fn max(self) -> Self {
        Self::aggregate(AggregateFunc::Max, self)
    }
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Add, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Sub, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Mul, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Div, rhs)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Negate(Box::new(self))
    }
}

// =============================================================================
// Introspection
// =============================================================================

/// Context an expression is used in.
///
/// Dimensions are row-level and must not aggregate; measures must aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    Dimension,
    Measure,
}

/// Structural problems with an expression in a given context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("aggregate functions are not allowed in a dimension")]
    AggregateNotAllowed,

    #[error("a measure must aggregate")]
    MissingAggregate,

    #[error("aggregate functions cannot be nested")]
    NestedAggregate,

    #[error("column '{column}' is used outside of an aggregate in a measure")]
    UnaggregatedColumn { column: String },
}

impl Expr {
    /// All column names referenced by this expression, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::Negate(inner) => inner.collect_columns(out),
            Expr::Aggregate { arg, .. } => arg.collect_columns(out),
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Column(_) | Expr::Literal(_) => false,
            Expr::Binary { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expr::Negate(inner) => inner.contains_aggregate(),
        }
    }

    /// Check the expression is well-formed for its context.
    pub fn validate_context(&self, context: ExprContext) -> Result<(), ExprError> {
        match context {
            ExprContext::Dimension => {
                if self.contains_aggregate() {
                    Err(ExprError::AggregateNotAllowed)
                } else {
                    Ok(())
                }
            }
            ExprContext::Measure => {
                if !self.contains_aggregate() {
                    return Err(ExprError::MissingAggregate);
                }
                self.validate_measure_node()
            }
        }
    }

    // Walks the post-aggregation part of a measure: every column must sit under
    // exactly one aggregate.
    fn validate_measure_node(&self) -> Result<(), ExprError> {
        match self {
            Expr::Column(name) => Err(ExprError::UnaggregatedColumn {
                column: name.clone(),
            }),
            Expr::Literal(_) => Ok(()),
            Expr::Binary { left, right, .. } => {
                left.validate_measure_node()?;
                right.validate_measure_node()
            }
            Expr::Negate(inner) => inner.validate_measure_node(),
            Expr::Aggregate { arg, .. } => {
                if arg.contains_aggregate() {
                    Err(ExprError::NestedAggregate)
                } else {
                    Ok(())
                }
            }
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Format a float so it always reads back as a float (`2.0`, not `2`).
///
/// SQL engines treat `2` as an integer, so `sum(x) / 2` would truncate.
pub(crate) fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(v) => f.write_str(&format_float(*v)),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Binary { left, op, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right)
            }
            Expr::Negate(inner) => {
                write!(f, "-")?;
                write_operand(f, inner)
            }
            Expr::Aggregate { func, arg } => write!(f, "{}({})", func.name(), arg),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if matches!(expr, Expr::Binary { .. }) {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
