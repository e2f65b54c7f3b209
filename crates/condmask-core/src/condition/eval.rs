use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::ast::{BinaryOp, CompareOp, Expr, Literal, LogicalOp, UnaryOp};
use super::error::ConditionError;
use crate::records::Record;

/// Identifier that names the whole record when no field shadows it.
const RECORD_IDENT: &str = "record";

/// Runtime value produced while evaluating an expression.
///
/// Equality never crosses kinds: `Bool` is not a number, so `true == 1` and
/// `false == 0` are both false.
#[derive(Debug, Clone)]
enum Operand<'r> {
    Null,
    Bool(bool),
    Number(f64),
    Text(Cow<'r, str>),
    List(Vec<Operand<'r>>),
    Object(&'r Map<String, Value>),
}

impl<'r> Operand<'r> {
    fn from_json(value: &'r Value) -> Self {
        match value {
            Value::Null => Operand::Null,
            Value::Bool(value) => Operand::Bool(*value),
            Value::Number(number) => Operand::Number(number.as_f64().unwrap_or(f64::NAN)),
            Value::String(text) => Operand::Text(Cow::Borrowed(text.as_str())),
            Value::Array(items) => Operand::List(items.iter().map(Operand::from_json).collect()),
            Value::Object(map) => Operand::Object(map),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Operand::Null => "null",
            Operand::Bool(_) => "bool",
            Operand::Number(_) => "number",
            Operand::Text(_) => "text",
            Operand::List(_) => "list",
            Operand::Object(_) => "object",
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Operand::Null => false,
            Operand::Bool(value) => *value,
            Operand::Number(value) => *value != 0.0,
            Operand::Text(value) => !value.is_empty(),
            Operand::List(items) => !items.is_empty(),
            Operand::Object(map) => !map.is_empty(),
        }
    }
}

/// Evaluate a parsed expression against a record and reduce it to a boolean.
pub fn evaluate(expr: &Expr, record: &Record) -> Result<bool, ConditionError> {
    eval(expr, record).map(|value| value.truthy())
}

fn eval<'r>(expr: &'r Expr, record: &'r Record) -> Result<Operand<'r>, ConditionError> {
    match expr {
        Expr::Literal(literal) => Ok(match literal {
            Literal::Null => Operand::Null,
            Literal::Bool(value) => Operand::Bool(*value),
            Literal::Number(value) => Operand::Number(*value),
            Literal::Text(value) => Operand::Text(Cow::Borrowed(value.as_str())),
        }),
        Expr::Ident(name) => resolve(name, record),
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, record))
            .collect::<Result<Vec<_>, _>>()
            .map(Operand::List),
        Expr::Index { target, index } => {
            let target = eval(target, record)?;
            let index = eval(index, record)?;
            subscript(target, &index)
        }
        Expr::Unary { op, operand } => {
            let operand = eval(operand, record)?;
            match op {
                UnaryOp::Not => Ok(Operand::Bool(!operand.truthy())),
                UnaryOp::Neg => match operand {
                    Operand::Number(value) => Ok(Operand::Number(-value)),
                    other => Err(ConditionError::TypeMismatch(format!(
                        "cannot negate {}",
                        other.kind()
                    ))),
                },
            }
        }
        Expr::Binary { first, rest } => {
            let mut acc = eval(first, record)?;
            for (op, rhs) in rest {
                let rhs = eval(rhs, record)?;
                acc = arithmetic(*op, acc, rhs)?;
            }
            Ok(acc)
        }
        Expr::Logical { op, operands } => {
            let Some((last, leading)) = operands.split_last() else {
                return Ok(Operand::Bool(matches!(op, LogicalOp::And)));
            };
            for operand in leading {
                let value = eval(operand, record)?;
                match (op, value.truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => return Ok(value),
                    _ => {}
                }
            }
            eval(last, record)
        }
        Expr::Compare { first, rest } => {
            let mut lhs = eval(first, record)?;
            for (op, rhs_expr) in rest {
                let rhs = eval(rhs_expr, record)?;
                if !compare(*op, &lhs, &rhs)? {
                    return Ok(Operand::Bool(false));
                }
                lhs = rhs;
            }
            Ok(Operand::Bool(true))
        }
    }
}

fn resolve<'r>(name: &str, record: &'r Record) -> Result<Operand<'r>, ConditionError> {
    if let Some(value) = record.get(name) {
        return Ok(Operand::from_json(value));
    }
    if name == RECORD_IDENT {
        return Ok(Operand::Object(record));
    }
    Err(ConditionError::UnresolvedReference(name.to_string()))
}

fn subscript<'r>(target: Operand<'r>, index: &Operand<'_>) -> Result<Operand<'r>, ConditionError> {
    match (target, index) {
        (Operand::Object(map), Operand::Text(key)) => map
            .get(&**key)
            .map(Operand::from_json)
            .ok_or_else(|| ConditionError::UnresolvedReference(key.to_string())),
        (Operand::List(mut items), Operand::Number(raw)) => {
            if raw.fract() != 0.0 || !raw.is_finite() {
                return Err(ConditionError::TypeMismatch(format!(
                    "list index must be an integer, got {raw}"
                )));
            }
            let len = items.len();
            let index = *raw as i64;
            let resolved = if index < 0 { index + len as i64 } else { index };
            if resolved < 0 || resolved >= len as i64 {
                return Err(ConditionError::IndexOutOfRange { index, len });
            }
            Ok(items.swap_remove(resolved as usize))
        }
        (target, index) => Err(ConditionError::TypeMismatch(format!(
            "cannot index {} with {}",
            target.kind(),
            index.kind()
        ))),
    }
}

fn arithmetic<'r>(
    op: BinaryOp,
    lhs: Operand<'r>,
    rhs: Operand<'r>,
) -> Result<Operand<'r>, ConditionError> {
    match (op, lhs, rhs) {
        (BinaryOp::Add, Operand::Text(a), Operand::Text(b)) => {
            Ok(Operand::Text(Cow::Owned(format!("{a}{b}"))))
        }
        (op, Operand::Number(a), Operand::Number(b)) => {
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => {
                    if b == 0.0 {
                        return Err(ConditionError::DivisionByZero);
                    }
                    a / b
                }
                BinaryOp::Rem => {
                    if b == 0.0 {
                        return Err(ConditionError::DivisionByZero);
                    }
                    a - b * (a / b).floor()
                }
            };
            Ok(Operand::Number(value))
        }
        (op, lhs, rhs) => Err(ConditionError::TypeMismatch(format!(
            "unsupported operand kinds for {}: {} and {}",
            binary_symbol(op),
            lhs.kind(),
            rhs.kind()
        ))),
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
    }
}

fn compare(op: CompareOp, lhs: &Operand<'_>, rhs: &Operand<'_>) -> Result<bool, ConditionError> {
    match op {
        CompareOp::Eq => Ok(equals(lhs, rhs)),
        CompareOp::Ne => Ok(!equals(lhs, rhs)),
        CompareOp::In => contains(lhs, rhs),
        CompareOp::NotIn => contains(lhs, rhs).map(|found| !found),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Operand::Number(a), Operand::Number(b)) => a.partial_cmp(b),
                (Operand::Text(a), Operand::Text(b)) => Some(a.cmp(b)),
                _ => {
                    return Err(ConditionError::TypeMismatch(format!(
                        "'{}' not supported between {} and {}",
                        op.as_str(),
                        lhs.kind(),
                        rhs.kind()
                    )));
                }
            };
            // NaN compares false in every direction.
            let Some(ordering) = ordering else {
                return Ok(false);
            };
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

fn equals(lhs: &Operand<'_>, rhs: &Operand<'_>) -> bool {
    match (lhs, rhs) {
        (Operand::Null, Operand::Null) => true,
        (Operand::Bool(a), Operand::Bool(b)) => a == b,
        (Operand::Number(a), Operand::Number(b)) => a == b,
        (Operand::Text(a), Operand::Text(b)) => a == b,
        (Operand::List(a), Operand::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals(x, y))
        }
        (Operand::Object(a), Operand::Object(b)) => a == b,
        _ => false,
    }
}

fn contains(needle: &Operand<'_>, haystack: &Operand<'_>) -> Result<bool, ConditionError> {
    match (needle, haystack) {
        (Operand::Text(needle), Operand::Text(haystack)) => Ok(haystack.contains(&**needle)),
        (needle, Operand::List(items)) => Ok(items.iter().any(|item| equals(needle, item))),
        (Operand::Text(key), Operand::Object(map)) => Ok(map.contains_key(&**key)),
        (needle, haystack) => Err(ConditionError::TypeMismatch(format!(
            "'in' not supported between {} and {}",
            needle.kind(),
            haystack.kind()
        ))),
    }
}
