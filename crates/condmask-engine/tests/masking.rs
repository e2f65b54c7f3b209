use condmask_core::{Record, parse_records};
use condmask_engine::{MaskingEngine, render_report};
use condmask_generate::{
    FakerGenerator, LocaleKey, MASKED, MASKED_ERROR, SequenceGenerator,
};
use condmask_rules::{MaskingCategory, Rule, RuleSet};
use serde_json::{Value, json};

fn rule(condition: &str, field: &str, masking_type: &str) -> Rule {
    Rule {
        condition: condition.to_string(),
        field: field.to_string(),
        masking_type: MaskingCategory::parse(masking_type),
    }
}

fn records(value: Value) -> Vec<Record> {
    parse_records(&value.to_string()).expect("test records")
}

fn employees() -> Vec<Record> {
    records(json!([
        {"name": "A", "department": "HR", "email": "a@x.com", "age": 65},
        {"name": "B", "department": "Sales", "email": "b@x.com", "age": 30}
    ]))
}

#[test]
fn hr_scenario_masks_only_matching_record() {
    let rules = RuleSet::new(vec![rule("department == 'HR'", "email", "email")]);
    let input = employees();
    let mut engine = MaskingEngine::new(&rules, FakerGenerator::new(LocaleKey::EnUs));

    let outcome = engine.mask_records(&input);

    assert_eq!(outcome.records.len(), 2);
    let masked_email = outcome.records[0]["email"].as_str().expect("string email");
    assert_ne!(masked_email, "a@x.com");
    assert!(masked_email.contains('@'));
    assert_eq!(outcome.records[1], input[1]);
}

#[test]
fn input_records_are_not_modified() {
    let rules = RuleSet::new(vec![rule("true", "name", "name")]);
    let input = employees();
    let snapshot = input.clone();
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    assert_eq!(input, snapshot);
    assert_eq!(outcome.records[0]["name"], "name#1");
    assert_eq!(outcome.records[1]["name"], "name#2");
}

#[test]
fn order_and_cardinality_are_preserved() {
    let input = records(json!([
        {"id": 3, "name": "c"},
        {"id": 1, "name": "a"},
        {"id": 2},
        {"id": 9, "name": "z"}
    ]));
    let rules = RuleSet::new(vec![rule("id > 1", "name", "name")]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    let ids: Vec<&Value> = outcome.records.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(3), &json!(1), &json!(2), &json!(9)]);
    assert_eq!(outcome.report.records_in, 4);
    assert_eq!(outcome.report.records_out, 4);
}

#[test]
fn false_condition_leaves_field_unchanged() {
    let rules = RuleSet::new(vec![rule("age > 100", "email", "email")]);
    let input = employees();
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    assert_eq!(outcome.records, input);
    assert_eq!(outcome.report.rules[0].evaluated, 2);
    assert_eq!(outcome.report.rules[0].matched, 0);
}

#[test]
fn later_rule_wins_on_same_field() {
    let rules = RuleSet::new(vec![
        rule("department == 'HR'", "email", "email"),
        rule("age > 60", "email", "company"),
    ]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.records[0]["email"], "company#2");
    assert_eq!(outcome.records[1]["email"], "b@x.com");
}

#[test]
fn conditions_see_earlier_replacements() {
    let rules = RuleSet::new(vec![
        rule("department == 'HR'", "department", "company"),
        rule("department == 'HR'", "email", "email"),
    ]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.records[0]["department"], "company#1");
    assert_eq!(outcome.records[0]["email"], "a@x.com");
}

#[test]
fn unresolved_reference_skips_only_that_rule() {
    let rules = RuleSet::new(vec![
        rule("salary_band == 'C'", "email", "email"),
        rule("department == 'Sales'", "name", "name"),
    ]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.records[0]["email"], "a@x.com");
    assert_eq!(outcome.records[1]["email"], "b@x.com");
    assert_eq!(outcome.records[1]["name"], "name#1");
    assert_eq!(outcome.report.rules[0].unresolved_references, 2);
    assert_eq!(outcome.report.rules[1].applied, 1);
}

#[test]
fn malformed_and_mistyped_conditions_are_skipped() {
    let rules = RuleSet::new(vec![
        rule("department = 'HR'", "email", "email"),
        rule("age > 'old'", "email", "email"),
        rule("age >= 65", "name", "name"),
    ]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.report.rules[0].condition_errors, 2);
    assert_eq!(outcome.report.rules[1].condition_errors, 2);
    assert_eq!(outcome.report.conditions_skipped(), 4);
    assert_eq!(outcome.records[0]["name"], "name#1");
}

#[test]
fn missing_target_field_is_not_created() {
    let rules = RuleSet::new(vec![rule("true", "phone_number", "phone_number")]);
    let input = records(json!([
        {"name": "A", "phone_number": "555-0100"},
        {"name": "B"}
    ]));
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    assert_eq!(outcome.records[0]["phone_number"], "phone_number#1");
    assert_eq!(outcome.records[1], input[1]);
    assert!(!outcome.records[1].contains_key("phone_number"));
    assert_eq!(outcome.report.rules[0].missing_field, 1);
}

#[test]
fn null_valued_field_counts_as_present() {
    let rules = RuleSet::new(vec![rule("manager is None", "manager", "name")]);
    let input = records(json!([{"manager": null}]));
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    assert_eq!(outcome.records[0]["manager"], "name#1");
}

#[test]
fn unknown_category_writes_masked_sentinel() {
    let rules = RuleSet::new(vec![rule("true", "email", "nickname")]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.records[0]["email"], MASKED);
    assert_eq!(outcome.records[1]["email"], MASKED);
    assert_eq!(outcome.report.sentinels.masked, 2);
}

#[test]
fn generator_failure_writes_error_sentinel() {
    let rules = RuleSet::new(vec![
        rule("true", "email", "email"),
        rule("true", "name", "name"),
    ]);
    let generator = SequenceGenerator::new().failing_on(MaskingCategory::Email);
    let mut engine = MaskingEngine::new(&rules, generator);

    let outcome = engine.mask_records(&employees());

    assert_eq!(outcome.records[0]["email"], MASKED_ERROR);
    assert_eq!(outcome.records[0]["name"], "name#1");
    assert_eq!(outcome.report.sentinels.masked_error, 2);
}

#[test]
fn non_targeted_fields_keep_their_values_and_order() {
    let rules = RuleSet::new(vec![rule("true", "email", "email")]);
    let input = employees();
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    for (before, after) in input.iter().zip(&outcome.records) {
        let before_keys: Vec<&String> = before.keys().collect();
        let after_keys: Vec<&String> = after.keys().collect();
        assert_eq!(before_keys, after_keys);
        for (key, value) in before {
            if key != "email" {
                assert_eq!(&after[key], value);
            }
        }
    }
}

#[test]
fn mask_record_applies_rules_to_one_record() {
    let rules = RuleSet::new(vec![rule("age > 60", "name", "name")]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let masked = engine.mask_record(&employees()[0]);

    assert_eq!(masked["name"], "name#1");
}

#[test]
fn empty_rule_set_passes_records_through() {
    let rules = RuleSet::default();
    let input = employees();
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);

    assert_eq!(outcome.records, input);
    assert!(outcome.report.rules.is_empty());
}

#[test]
fn report_renders_rule_table() {
    let rules = RuleSet::new(vec![
        rule("department == 'HR'", "email", "email"),
        rule("true", "email", "nickname"),
    ]);
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&employees());
    let rendered = render_report(&outcome.report);

    assert!(rendered.starts_with("# Masking Report"));
    assert!(rendered.contains("- records_in: 2"));
    assert!(rendered.contains("| 0 | email | email | 1 | 1 | 0 | 0 | 0 |"));
    assert!(rendered.contains("- MASKED: 2"));
    assert!(!rendered.contains("a@x.com"));
}

#[test]
fn report_escapes_pipes_in_table_cells() {
    let rules = RuleSet::new(vec![rule("true", "a|b", "x|y")]);
    let input = records(json!([{"a|b": "secret"}]));
    let mut engine = MaskingEngine::new(&rules, SequenceGenerator::new());

    let outcome = engine.mask_records(&input);
    let rendered = render_report(&outcome.report);

    assert_eq!(outcome.records[0]["a|b"], MASKED);
    assert!(rendered.contains("| 0 | a\\|b | x\\|y | 1 | 1 | 0 | 0 | 0 |"));
}
