use condmask_core::parse_condition;
use serde_json::Value;

use crate::errors::{ValidationIssue, ValidationReport};
use crate::model::{KNOWN_CATEGORY_TAGS, MaskingCategory};

const REQUIRED_ATTRIBUTES: &[&str] = &["condition", "field", "masking_type"];

/// Validate the shape of a rule document (a JSON array of rule objects).
pub fn validate_rule_document(document: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_rules_at(document, "", &mut report);
    report
}

pub(crate) fn validate_rules_at(document: &Value, base: &str, report: &mut ValidationReport) {
    let Value::Array(rules) = document else {
        report.push(ValidationIssue::error(
            "rules_not_sequence",
            pointer(base),
            format!("rule set must be a list of rules, found {}", kind_name(document)),
            Some("wrap the rules in a JSON array".to_string()),
        ));
        return;
    };

    if rules.is_empty() {
        report.push(ValidationIssue::warning(
            "rules_empty",
            pointer(base),
            "rule set contains no rules; records pass through unchanged",
            None,
        ));
    }

    for (idx, rule) in rules.iter().enumerate() {
        validate_rule(rule, &format!("{base}/{idx}"), report);
    }
}

fn validate_rule(rule: &Value, path: &str, report: &mut ValidationReport) {
    let Value::Object(attributes) = rule else {
        report.push(ValidationIssue::error(
            "rule_not_mapping",
            path,
            format!("rule must be an object, found {}", kind_name(rule)),
            Some("use an object with 'condition', 'field' and 'masking_type'".to_string()),
        ));
        return;
    };

    for &name in REQUIRED_ATTRIBUTES {
        let attribute_path = format!("{path}/{name}");
        match attributes.get(name) {
            None => report.push(ValidationIssue::error(
                "attribute_missing",
                attribute_path,
                format!("rule is missing required attribute '{name}'"),
                Some(format!("add a '{name}' string to the rule")),
            )),
            Some(Value::String(_)) => {}
            Some(other) => report.push(ValidationIssue::error(
                "attribute_not_string",
                attribute_path,
                format!("'{name}' must be a string, found {}", kind_name(other)),
                None,
            )),
        }
    }

    for key in attributes.keys() {
        if !REQUIRED_ATTRIBUTES.contains(&key.as_str()) {
            report.push(ValidationIssue::warning(
                "attribute_unknown",
                format!("{path}/{key}"),
                format!("unknown attribute '{key}' is ignored"),
                None,
            ));
        }
    }

    if let Some(Value::String(condition)) = attributes.get("condition")
        && let Err(err) = parse_condition(condition)
    {
        report.push(ValidationIssue::warning(
            "condition_unparseable",
            format!("{path}/condition"),
            format!("condition will be skipped for every record: {err}"),
            None,
        ));
    }

    if let Some(Value::String(tag)) = attributes.get("masking_type")
        && !MaskingCategory::parse(tag).is_known()
    {
        report.push(ValidationIssue::warning(
            "masking_type_unknown",
            format!("{path}/masking_type"),
            format!("unknown masking type '{tag}' will write the MASKED sentinel"),
            Some(format!("use one of: {}", KNOWN_CATEGORY_TAGS.join(", "))),
        ));
    }
}

fn pointer(base: &str) -> String {
    if base.is_empty() {
        "/".to_string()
    } else {
        base.to_string()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
