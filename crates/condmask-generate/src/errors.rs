use thiserror::Error;

/// Errors emitted by value generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("unknown masking category '{0}'")]
    UnknownCategory(String),
    #[error("unsupported locale '{0}' (expected en_US or pt_BR)")]
    UnsupportedLocale(String),
    #[error("generator failed for '{category}': {message}")]
    Failed { category: String, message: String },
}
