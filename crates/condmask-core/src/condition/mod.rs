//! Predicate language for rule conditions.
//!
//! A condition is parsed into an [`Expr`] tree and evaluated against a single
//! record, with every record field bound as a variable by name. The language
//! is closed: literals, field references, subscripts, arithmetic,
//! comparisons (including `in`, `is` and chains such as `18 <= age < 65`)
//! and boolean `and`/`or`/`not`.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, CompareOp, Expr, Literal, LogicalOp, UnaryOp};
pub use error::ConditionError;
pub use eval::evaluate;
pub use parser::parse_condition;

use crate::records::Record;

/// Parse `condition` and evaluate it against `record`.
///
/// The expression is parsed fresh on every call; nothing is cached between
/// records.
pub fn evaluate_condition(condition: &str, record: &Record) -> Result<bool, ConditionError> {
    let expr = parse_condition(condition)?;
    evaluate(&expr, record)
}
