use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{RuleSetError, ValidationIssue, ValidationReport};
use crate::model::{Rule, RuleSet};
use crate::validate::validate_rules_at;

/// Key holding the rule array in a TOML rule file (`[[rules]]`).
const TOML_RULES_KEY: &str = "rules";

/// Serialized form of a rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Toml,
}

impl RuleFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Rule set that passed validation, with the warnings it produced.
#[derive(Debug, Clone)]
pub struct LoadedRuleSet {
    pub rule_set: RuleSet,
    pub warnings: Vec<ValidationIssue>,
}

/// Parse and validate rule-set content. Any error rejects the whole set.
pub fn load_rule_set(content: &str, format: RuleFormat) -> Result<LoadedRuleSet, RuleSetError> {
    let mut report = ValidationReport::default();
    let rules = match format {
        RuleFormat::Json => {
            let document: Value = serde_json::from_str(content)?;
            validate_rules_at(&document, "", &mut report);
            document
        }
        RuleFormat::Toml => {
            let document: toml::Value = toml::from_str(content)?;
            let mut document = serde_json::to_value(document)?;
            match document.get_mut(TOML_RULES_KEY).map(Value::take) {
                Some(rules) => {
                    validate_rules_at(&rules, &format!("/{TOML_RULES_KEY}"), &mut report);
                    rules
                }
                None => {
                    report.push(ValidationIssue::error(
                        "rules_key_missing",
                        format!("/{TOML_RULES_KEY}"),
                        "TOML rule set must define its rules as [[rules]] tables",
                        None,
                    ));
                    Value::Null
                }
            }
        }
    };

    if !report.is_ok() {
        return Err(RuleSetError::Invalid(report));
    }

    let rules: Vec<Rule> = serde_json::from_value(rules)?;
    Ok(LoadedRuleSet {
        rule_set: RuleSet::new(rules),
        warnings: report.warnings,
    })
}

/// Read a rule file, choosing the format from its extension.
pub fn load_rule_set_file(path: &Path) -> Result<LoadedRuleSet, RuleSetError> {
    let format = RuleFormat::from_path(path)
        .ok_or_else(|| RuleSetError::UnsupportedFormat(path.display().to_string()))?;
    let content = fs::read_to_string(path)?;
    load_rule_set(&content, format)
}
