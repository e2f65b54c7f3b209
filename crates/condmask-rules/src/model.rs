use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Masking category tags recognized by the value generators.
pub const KNOWN_CATEGORY_TAGS: &[&str] = &[
    "name",
    "email",
    "address",
    "phone_number",
    "company",
    "ssn",
    "date",
    "city",
    "country",
    "text",
    "password",
];

/// Kind of synthetic value written into a masked field.
///
/// Tags outside [`KNOWN_CATEGORY_TAGS`] are kept verbatim in `Unknown` so a
/// rule set with a typo still loads; such rules write the `MASKED` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaskingCategory {
    Name,
    Email,
    Address,
    PhoneNumber,
    Company,
    Ssn,
    Date,
    City,
    Country,
    Text,
    Password,
    Unknown(String),
}

impl MaskingCategory {
    /// Parse a tag. Matching is exact and case-sensitive.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "name" => Self::Name,
            "email" => Self::Email,
            "address" => Self::Address,
            "phone_number" => Self::PhoneNumber,
            "company" => Self::Company,
            "ssn" => Self::Ssn,
            "date" => Self::Date,
            "city" => Self::City,
            "country" => Self::Country,
            "text" => Self::Text,
            "password" => Self::Password,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::PhoneNumber => "phone_number",
            Self::Company => "company",
            Self::Ssn => "ssn",
            Self::Date => "date",
            Self::City => "city",
            Self::Country => "country",
            Self::Text => "text",
            Self::Password => "password",
            Self::Unknown(tag) => tag.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for MaskingCategory {
    fn from(tag: String) -> Self {
        match Self::parse(&tag) {
            Self::Unknown(_) => Self::Unknown(tag),
            known => known,
        }
    }
}

impl From<MaskingCategory> for String {
    fn from(category: MaskingCategory) -> Self {
        match category {
            MaskingCategory::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MaskingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One masking rule: when `condition` holds for a record, replace `field`
/// with a generated value of kind `masking_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    /// Predicate over the record's fields, e.g. `department == 'HR'`.
    pub condition: String,
    /// Name of the field replaced when the condition holds.
    pub field: String,
    /// Masking category tag (name, email, address, phone_number, company,
    /// ssn, date, city, country, text, password).
    #[schemars(with = "String")]
    pub masking_type: MaskingCategory,
}

/// Ordered, immutable sequence of rules. Order is application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_tag_round_trips() {
        for tag in KNOWN_CATEGORY_TAGS {
            let category = MaskingCategory::parse(tag);
            assert!(category.is_known(), "{tag} should be known");
            assert_eq!(category.as_str(), *tag);
        }
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let category = MaskingCategory::parse("Email");
        assert_eq!(category, MaskingCategory::Unknown("Email".to_string()));
        assert_eq!(String::from(category), "Email");
    }

    #[test]
    fn rule_deserializes_category_from_string() {
        let rule: Rule = serde_json::from_str(
            r#"{"condition": "age > 60", "field": "address", "masking_type": "address"}"#,
        )
        .expect("parse rule");
        assert_eq!(rule.masking_type, MaskingCategory::Address);

        let encoded = serde_json::to_value(&rule).expect("serialize rule");
        assert_eq!(encoded["masking_type"], "address");
    }
}
