//! Masking rule contracts, loading, and validation.
//!
//! A rule set is an ordered list of `{condition, field, masking_type}`
//! triples. Loading is all-or-nothing: any structural problem rejects the
//! whole set, while softer problems (an unparseable condition, an unknown
//! masking type) are reported as warnings and handled per record later.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, RuleSetError, ValidationIssue, ValidationReport};
pub use load::{LoadedRuleSet, RuleFormat, load_rule_set, load_rule_set_file};
pub use model::{KNOWN_CATEGORY_TAGS, MaskingCategory, Rule, RuleSet};
pub use schema::rule_set_json_schema;
pub use validate::validate_rule_document;
