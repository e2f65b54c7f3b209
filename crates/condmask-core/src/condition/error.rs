use thiserror::Error;

/// Failure while parsing or evaluating a rule condition.
///
/// Every variant is local to one (record, rule) pair: the engine skips the
/// rule for that record and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// The expression text is malformed. `position` is a byte offset.
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },
    /// The expression names a field the record does not have.
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: i64, len: usize },
}

impl ConditionError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Returns true when the failure is a reference to a missing field.
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, Self::UnresolvedReference(_))
    }
}
