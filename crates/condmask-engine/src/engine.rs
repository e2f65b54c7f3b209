use condmask_core::{Record, evaluate_condition};
use condmask_generate::{MaskedValue, ValueGenerator, masked_value};
use condmask_rules::{Rule, RuleSet};
use serde_json::Value;

use crate::report::{MaskReport, RuleStats, SentinelCounts};

/// Masked records plus the statistics gathered while producing them.
#[derive(Debug, Clone)]
pub struct MaskOutcome {
    pub records: Vec<Record>,
    pub report: MaskReport,
}

/// Applies a rule set to records using an injected value generator.
///
/// Records are processed in order and every rule is attempted against every
/// record. Failures inside a (record, rule) pair are logged and skip only
/// that pair.
pub struct MaskingEngine<'a, G> {
    rules: &'a RuleSet,
    generator: G,
}

impl<'a, G: ValueGenerator> MaskingEngine<'a, G> {
    pub fn new(rules: &'a RuleSet, generator: G) -> Self {
        Self { rules, generator }
    }

    /// Mask every record, returning copies in input order. The input is
    /// never modified.
    pub fn mask_records(&mut self, records: &[Record]) -> MaskOutcome {
        let mut report = MaskReport::for_rules(self.rules);
        report.records_in = records.len() as u64;

        let mut masked = Vec::with_capacity(records.len());
        for (record_index, record) in records.iter().enumerate() {
            masked.push(self.apply_rules(record_index, record, &mut report));
        }
        report.records_out = masked.len() as u64;

        tracing::info!(
            event = "masking_finished",
            records = report.records_out,
            fields_masked = report.fields_masked(),
            conditions_skipped = report.conditions_skipped()
        );

        MaskOutcome {
            records: masked,
            report,
        }
    }

    /// Mask a single record without collecting statistics.
    pub fn mask_record(&mut self, record: &Record) -> Record {
        let mut report = MaskReport::for_rules(self.rules);
        self.apply_rules(0, record, &mut report)
    }

    fn apply_rules(&mut self, record_index: usize, record: &Record, report: &mut MaskReport) -> Record {
        let rules = self.rules;
        let mut masked = record.clone();

        for (rule_index, rule) in rules.iter().enumerate() {
            let stats = &mut report.rules[rule_index];
            stats.evaluated += 1;

            // Conditions see the copy, including earlier rules' replacements.
            match evaluate_condition(&rule.condition, &masked) {
                Ok(false) => {}
                Ok(true) => {
                    stats.matched += 1;
                    apply_rule(
                        &mut self.generator,
                        rule,
                        &mut masked,
                        stats,
                        &mut report.sentinels,
                        record_index,
                        rule_index,
                    );
                }
                Err(err) if err.is_unresolved_reference() => {
                    stats.unresolved_references += 1;
                    tracing::error!(
                        event = "condition_unresolved_reference",
                        record_index,
                        rule_index,
                        condition = %rule.condition,
                        error = %err,
                        "invalid variable in condition, skipping rule"
                    );
                }
                Err(err) => {
                    stats.condition_errors += 1;
                    tracing::error!(
                        event = "condition_failed",
                        record_index,
                        rule_index,
                        condition = %rule.condition,
                        error = %err,
                        "condition evaluation failed, skipping rule"
                    );
                }
            }
        }

        masked
    }
}

fn apply_rule<G: ValueGenerator>(
    generator: &mut G,
    rule: &Rule,
    record: &mut Record,
    stats: &mut RuleStats,
    sentinels: &mut SentinelCounts,
    record_index: usize,
    rule_index: usize,
) {
    let Some(slot) = record.get_mut(&rule.field) else {
        stats.missing_field += 1;
        tracing::warn!(
            event = "field_missing",
            record_index,
            rule_index,
            field = %rule.field,
            "field not found in record, skipping masking"
        );
        return;
    };

    let value = masked_value(generator, &rule.masking_type);
    match value {
        MaskedValue::Masked => sentinels.masked += 1,
        MaskedValue::MaskedError => sentinels.masked_error += 1,
        MaskedValue::Generated(_) => {}
    }
    *slot = Value::String(value.into_string());
    stats.applied += 1;
}
