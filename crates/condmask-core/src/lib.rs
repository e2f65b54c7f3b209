//! Core contracts and helpers for condmask.
//!
//! This crate defines the record model shared by every stage, the shape
//! checks applied to record collections, and the condition language used by
//! masking rules.

pub mod condition;
pub mod error;
pub mod records;

pub use condition::{ConditionError, Expr, evaluate_condition, parse_condition};
pub use error::{Error, Result};
pub use records::{Record, parse_records, records_to_json_pretty};
