use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Rule;

/// Emit the JSON Schema for a JSON rule file (a top-level array of rules).
pub fn rule_set_json_schema() -> RootSchema {
    schema_for!(Vec<Rule>)
}
