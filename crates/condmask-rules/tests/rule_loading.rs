use std::path::Path;

use condmask_rules::{
    MaskingCategory, RuleFormat, RuleSetError, load_rule_set, load_rule_set_file,
};

fn demo(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
}

#[test]
fn demo_json_rules_load_in_order() {
    let loaded = load_rule_set_file(&demo("rules.json")).expect("load rules.json");
    assert!(loaded.warnings.is_empty(), "unexpected warnings");

    let fields: Vec<&str> = loaded
        .rule_set
        .iter()
        .map(|rule| rule.field.as_str())
        .collect();
    assert_eq!(fields, vec!["email", "phone_number", "address"]);
    assert_eq!(
        loaded.rule_set.rules()[1].masking_type,
        MaskingCategory::PhoneNumber
    );
}

#[test]
fn demo_toml_rules_match_json_shape() {
    let json = load_rule_set_file(&demo("rules.json")).expect("load rules.json");
    let toml = load_rule_set_file(&demo("rules.toml")).expect("load rules.toml");
    assert_eq!(json.rule_set.len(), toml.rule_set.len());
    for (a, b) in json.rule_set.iter().zip(&toml.rule_set) {
        assert_eq!(a.field, b.field);
        assert_eq!(a.masking_type, b.masking_type);
    }
}

#[test]
fn malformed_json_fails_the_load() {
    let result = load_rule_set("[{\"condition\": ", RuleFormat::Json);
    assert!(matches!(result, Err(RuleSetError::Json(_))));
}

#[test]
fn malformed_toml_fails_the_load() {
    let result = load_rule_set("[[rules]\ncondition = ", RuleFormat::Toml);
    assert!(matches!(result, Err(RuleSetError::Toml(_))));
}

#[test]
fn one_bad_rule_rejects_the_whole_set() {
    let content = r#"[
        {"condition": "a == 1", "field": "x", "masking_type": "name"},
        {"condition": "b == 2", "field": "y"}
    ]"#;
    match load_rule_set(content, RuleFormat::Json) {
        Err(RuleSetError::Invalid(report)) => {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].path, "/1/masking_type");
        }
        other => panic!("expected invalid rule set, got {other:?}"),
    }
}

#[test]
fn toml_without_rules_table_is_rejected() {
    let result = load_rule_set("title = \"no rules\"\n", RuleFormat::Toml);
    match result {
        Err(RuleSetError::Invalid(report)) => assert!(report.has_code("rules_key_missing")),
        other => panic!("expected invalid rule set, got {other:?}"),
    }
}

#[test]
fn toml_issue_paths_point_into_rules_array() {
    let content = "[[rules]]\ncondition = \"a == 1\"\nfield = \"x\"\n";
    match load_rule_set(content, RuleFormat::Toml) {
        Err(RuleSetError::Invalid(report)) => {
            assert_eq!(report.errors[0].path, "/rules/0/masking_type");
        }
        other => panic!("expected invalid rule set, got {other:?}"),
    }
}

#[test]
fn warnings_do_not_block_loading() {
    let content = r#"[{"condition": "age >>", "field": "x", "masking_type": "nickname"}]"#;
    let loaded = load_rule_set(content, RuleFormat::Json).expect("load with warnings");
    assert_eq!(loaded.rule_set.len(), 1);
    assert_eq!(loaded.warnings.len(), 2);
    assert_eq!(
        loaded.rule_set.rules()[0].masking_type,
        MaskingCategory::Unknown("nickname".to_string())
    );
}

#[test]
fn format_is_chosen_from_extension() {
    assert_eq!(
        RuleFormat::from_path(Path::new("rules.JSON")),
        Some(RuleFormat::Json)
    );
    assert_eq!(
        RuleFormat::from_path(Path::new("conf/rules.toml")),
        Some(RuleFormat::Toml)
    );
    assert_eq!(RuleFormat::from_path(Path::new("rules.yaml")), None);
    assert!(matches!(
        load_rule_set_file(Path::new("rules.yaml")),
        Err(RuleSetError::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_rule_set_file(&demo("does-not-exist.json"));
    assert!(matches!(result, Err(RuleSetError::Io(_))));
}

#[test]
fn non_string_masking_type_rejects_the_whole_set() {
    let content = r#"[
        {"condition": "a == 1", "field": "x", "masking_type": "name"},
        {"condition": "b == 2", "field": "y", "masking_type": 7}
    ]"#;
    match load_rule_set(content, RuleFormat::Json) {
        Err(RuleSetError::Invalid(report)) => {
            assert_eq!(report.errors.len(), 1);
            assert_eq!(report.errors[0].code, "attribute_not_string");
            assert_eq!(report.errors[0].path, "/1/masking_type");
        }
        other => panic!("expected invalid rule set, got {other:?}"),
    }

    let toml = "[[rules]]\ncondition = \"true\"\nfield = \"x\"\nmasking_type = 7\n";
    match load_rule_set(toml, RuleFormat::Toml) {
        Err(RuleSetError::Invalid(report)) => {
            assert!(report.has_code("attribute_not_string"));
            assert_eq!(report.errors[0].path, "/rules/0/masking_type");
        }
        other => panic!("expected invalid rule set, got {other:?}"),
    }
}

#[test]
fn very_long_condition_loads_without_warnings() {
    let condition = vec!["department == 'HR'"; 10_000].join(" or ");
    let content = serde_json::json!([
        {"condition": condition, "field": "email", "masking_type": "email"}
    ])
    .to_string();

    let loaded = load_rule_set(&content, RuleFormat::Json).expect("load long condition");

    assert_eq!(loaded.rule_set.len(), 1);
    assert!(loaded.warnings.is_empty());
}
