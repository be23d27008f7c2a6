//! Parser for catalog expressions written as SQL-like strings.
//!
//! Model definition files spell dimensions and measures as text
//! (`sum(unit_price * quantity)`). The text is parsed with sqlparser and
//! converted into our [`Expr`] tree. Bare identifiers are namespaced with the
//! owning table; `table.column` identifiers are namespaced with the given table.

use sqlparser::ast as sql;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use thiserror::Error;

use crate::model::expr::{AggregateFunc, BinaryOp, Expr, Literal};
use crate::model::table::{namespaced, NAMESPACE_SEPARATOR};

/// Errors that can occur while parsing a catalog expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse an expression owned by `table`.
pub fn parse_expr(source: &str, table: &str) -> ParseResult<Expr> {
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect)
        .try_with_sql(source)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    let parsed = parser
        .parse_expr()
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    let trailing = parser.peek_token();
    if trailing.token != Token::EOF {
        return Err(ParseError::Syntax(format!(
            "unexpected trailing input '{}'",
            trailing.token
        )));
    }

    convert(&parsed, table)
}

fn convert(expr: &sql::Expr, table: &str) -> ParseResult<Expr> {
    match expr {
        sql::Expr::Identifier(ident) => Ok(Expr::Column(owned_column(table, &ident.value))),
        sql::Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [owner, column] => Ok(Expr::Column(namespaced(&owner.value, &column.value))),
            _ => Err(ParseError::Unsupported(expr.to_string())),
        },
        sql::Expr::Value(value) => convert_value(value).map(Expr::Literal),
        sql::Expr::Nested(inner) => convert(inner, table),
        sql::Expr::UnaryOp { op, expr: inner } => match op {
            sql::UnaryOperator::Minus => Ok(Expr::Negate(Box::new(convert(inner, table)?))),
            sql::UnaryOperator::Plus => convert(inner, table),
            _ => Err(ParseError::Unsupported(expr.to_string())),
        },
        sql::Expr::BinaryOp { left, op, right } => {
            let op = match op {
                sql::BinaryOperator::Plus => BinaryOp::Add,
                sql::BinaryOperator::Minus => BinaryOp::Sub,
                sql::BinaryOperator::Multiply => BinaryOp::Mul,
                sql::BinaryOperator::Divide => BinaryOp::Div,
                other => return Err(ParseError::Unsupported(format!("operator {}", other))),
            };
            Ok(Expr::binary(convert(left, table)?, op, convert(right, table)?))
        }
        sql::Expr::Function(func) => convert_function(func, table),
        other => Err(ParseError::Unsupported(other.to_string())),
    }
}

fn convert_value(value: &sql::Value) -> ParseResult<Literal> {
    match value {
        sql::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Literal::Int(i))
            } else {
                n.parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| ParseError::Syntax(format!("invalid number '{}'", n)))
            }
        }
        sql::Value::SingleQuotedString(s) => Ok(Literal::String(s.clone())),
        sql::Value::Boolean(b) => Ok(Literal::Bool(*b)),
        sql::Value::Null => Ok(Literal::Null),
        other => Err(ParseError::Unsupported(other.to_string())),
    }
}

fn convert_function(func: &sql::Function, table: &str) -> ParseResult<Expr> {
    if func.over.is_some() || func.filter.is_some() {
        return Err(ParseError::Unsupported(func.to_string()));
    }

    let list = match &func.args {
        sql::FunctionArguments::List(list) => list,
        _ => return Err(ParseError::Unsupported(func.to_string())),
    };

    let [arg] = list.args.as_slice() else {
        return Err(ParseError::Unsupported(format!(
            "{} expects exactly one argument",
            func.name
        )));
    };
    let arg = match arg {
        sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(e)) => convert(e, table)?,
        other => return Err(ParseError::Unsupported(other.to_string())),
    };

    let distinct = matches!(
        list.duplicate_treatment,
        Some(sql::DuplicateTreatment::Distinct)
    );

    let name = func.name.to_string().to_lowercase();
    let agg = match (name.as_str(), distinct) {
        ("sum", false) => AggregateFunc::Sum,
        ("avg" | "mean", false) => AggregateFunc::Mean,
        ("count", true) | ("count_distinct" | "nunique", false) => AggregateFunc::CountDistinct,
        ("count", false) => AggregateFunc::Count,
        ("min", false) => AggregateFunc::Min,
        ("max", false) => AggregateFunc::Max,
        _ => return Err(ParseError::Unsupported(func.to_string())),
    };

    Ok(Expr::aggregate(agg, arg))
}

fn owned_column(table: &str, column: &str) -> String {
    let prefix = format!("{}{}", table, NAMESPACE_SEPARATOR);
    if column.starts_with(&prefix) {
        column.to_string()
    } else {
        namespaced(table, column)
    }
}
