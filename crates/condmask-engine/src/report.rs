use condmask_rules::RuleSet;
use serde::Serialize;

/// Report contract version for masking runs.
pub const REPORT_VERSION: &str = "0.1";

/// Machine-readable summary of a masking run. Holds counts only, never
/// record values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskReport {
    pub report_version: String,
    pub records_in: u64,
    pub records_out: u64,
    pub rules: Vec<RuleStats>,
    pub sentinels: SentinelCounts,
}

/// Outcome counters for one rule across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub index: usize,
    pub field: String,
    pub masking_type: String,
    pub evaluated: u64,
    pub matched: u64,
    pub applied: u64,
    pub missing_field: u64,
    pub unresolved_references: u64,
    pub condition_errors: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentinelCounts {
    pub masked: u64,
    pub masked_error: u64,
}

impl MaskReport {
    /// Empty report with one zeroed entry per rule.
    pub fn for_rules(rules: &RuleSet) -> Self {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| RuleStats {
                index,
                field: rule.field.clone(),
                masking_type: rule.masking_type.to_string(),
                evaluated: 0,
                matched: 0,
                applied: 0,
                missing_field: 0,
                unresolved_references: 0,
                condition_errors: 0,
            })
            .collect();
        Self {
            report_version: REPORT_VERSION.to_string(),
            records_in: 0,
            records_out: 0,
            rules,
            sentinels: SentinelCounts::default(),
        }
    }

    /// Total number of field replacements, sentinels included.
    pub fn fields_masked(&self) -> u64 {
        self.rules.iter().map(|rule| rule.applied).sum()
    }

    /// Number of (record, rule) pairs skipped because the condition failed.
    pub fn conditions_skipped(&self) -> u64 {
        self.rules
            .iter()
            .map(|rule| rule.unresolved_references + rule.condition_errors)
            .sum()
    }
}

/// Render a deterministic markdown summary of a masking run.
pub fn render_report(report: &MaskReport) -> String {
    let mut lines = Vec::new();

    lines.push("# Masking Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- report_version: {}", report.report_version));
    lines.push(format!("- records_in: {}", report.records_in));
    lines.push(format!("- records_out: {}", report.records_out));
    lines.push(format!("- fields_masked: {}", report.fields_masked()));
    lines.push(format!("- conditions_skipped: {}", report.conditions_skipped()));
    lines.push(String::new());

    lines.push("## Rules".to_string());
    lines.push(
        "| # | field | masking_type | matched | applied | missing_field | unresolved | errors |"
            .to_string(),
    );
    lines.push("| --- | --- | --- | --- | --- | --- | --- | --- |".to_string());
    for rule in &report.rules {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            rule.index,
            escape_cell(&rule.field),
            escape_cell(&rule.masking_type),
            rule.matched,
            rule.applied,
            rule.missing_field,
            rule.unresolved_references,
            rule.condition_errors
        ));
    }
    lines.push(String::new());

    let sentinels = &report.sentinels;
    if sentinels.masked > 0 || sentinels.masked_error > 0 {
        lines.push("## Sentinels".to_string());
        lines.push(format!("- MASKED: {}", sentinels.masked));
        lines.push(format!("- MASKED_ERROR: {}", sentinels.masked_error));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Keep user-supplied text from splitting a markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
