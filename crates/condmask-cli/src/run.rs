use std::path::{Path, PathBuf};
use std::time::Instant;

use condmask_core::{parse_records, records_to_json_pretty};
use condmask_engine::{MaskReport, MaskingEngine, render_report};
use condmask_generate::{FakerGenerator, LocaleKey};
use condmask_rules::{LoadedRuleSet, RuleSetError, load_rule_set_file, rule_set_json_schema};
use uuid::Uuid;

use crate::CliError;
use crate::workspace::{
    FileRole, MaskSettings, require_extension, write_bytes_atomic, write_json_atomic,
};

/// Fully resolved inputs for one masking run.
#[derive(Debug, Clone)]
pub struct MaskOptions {
    pub rules: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub locale: LocaleKey,
    pub seed: Option<u64>,
    pub report: Option<PathBuf>,
}

impl MaskOptions {
    /// Merge command-line values over settings-file values.
    pub fn resolve(
        rules: PathBuf,
        input: PathBuf,
        output: PathBuf,
        locale: Option<String>,
        seed: Option<u64>,
        report: Option<PathBuf>,
        settings: MaskSettings,
    ) -> Result<Self, CliError> {
        let locale = match locale.or(settings.locale) {
            Some(value) => value.parse::<LocaleKey>()?,
            None => LocaleKey::default(),
        };
        Ok(Self {
            rules,
            input,
            output,
            locale,
            seed: seed.or(settings.seed),
            report: report.or(settings.report),
        })
    }
}

pub fn run_mask(options: &MaskOptions) -> Result<MaskReport, CliError> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    let timer = Instant::now();

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        started_at = %started_at.to_rfc3339(),
        locale = %options.locale,
        seeded = options.seed.is_some()
    );

    require_extension(&options.rules, FileRole::Rules)?;
    require_extension(&options.input, FileRole::Input)?;
    require_extension(&options.output, FileRole::Output)?;

    let loaded = load_rules(&options.rules)?;
    let rule_set = loaded.rule_set;

    let content = std::fs::read_to_string(&options.input)?;
    let records = parse_records(&content)?;
    tracing::info!(
        event = "records_loaded",
        path = %options.input.display(),
        records = records.len()
    );

    let generator = match options.seed {
        Some(seed) => FakerGenerator::seeded(options.locale, seed),
        None => FakerGenerator::new(options.locale),
    };
    let mut engine = MaskingEngine::new(&rule_set, generator);
    let outcome = engine.mask_records(&records);

    let data = records_to_json_pretty(&outcome.records)?;
    write_bytes_atomic(&options.output, &data)?;
    tracing::info!(
        event = "output_written",
        path = %options.output.display(),
        records = outcome.records.len()
    );

    if let Some(report_path) = &options.report {
        write_report(report_path, &outcome.report)?;
        tracing::info!(event = "report_written", path = %report_path.display());
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        duration_ms = duration_ms
    );

    Ok(outcome.report)
}

pub fn run_validate(rules: &Path) -> Result<(), CliError> {
    require_extension(rules, FileRole::Rules)?;
    let loaded = load_rules(rules)?;
    tracing::info!(
        event = "validation_passed",
        path = %rules.display(),
        rules = loaded.rule_set.len(),
        warnings = loaded.warnings.len()
    );
    Ok(())
}

pub fn run_schema(out: Option<&Path>) -> Result<(), CliError> {
    let schema = rule_set_json_schema();
    match out {
        Some(path) => {
            write_json_atomic(path, &schema)?;
            tracing::info!(event = "schema_written", path = %path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&schema)?),
    }
    Ok(())
}

/// Load a rule file, logging every validation issue it produced.
fn load_rules(path: &Path) -> Result<LoadedRuleSet, CliError> {
    match load_rule_set_file(path) {
        Ok(loaded) => {
            for issue in &loaded.warnings {
                tracing::warn!(
                    event = "rule_warning",
                    code = %issue.code,
                    path = %issue.path,
                    message = %issue.message
                );
            }
            tracing::info!(
                event = "rules_loaded",
                path = %path.display(),
                rules = loaded.rule_set.len()
            );
            Ok(loaded)
        }
        Err(RuleSetError::Invalid(report)) => {
            for issue in &report.errors {
                tracing::error!(
                    event = "rule_invalid",
                    code = %issue.code,
                    path = %issue.path,
                    message = %issue.message
                );
            }
            Err(RuleSetError::Invalid(report).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn write_report(path: &Path, report: &MaskReport) -> Result<(), CliError> {
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if is_markdown {
        write_bytes_atomic(path, render_report(report).as_bytes())?;
    } else {
        write_json_atomic(path, report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::{Value, json};

    use super::*;

    struct Scratch {
        dir: PathBuf,
    }

    impl Scratch {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("condmask-run-{}", Uuid::new_v4()));
            fs::create_dir_all(&dir).expect("create scratch dir");
            Self { dir }
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.join(name);
            fs::write(&path, content).expect("write fixture");
            path
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.join(name)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    fn options(scratch: &Scratch, rules: PathBuf, input: PathBuf) -> MaskOptions {
        MaskOptions {
            rules,
            input,
            output: scratch.path("out.json"),
            locale: LocaleKey::EnUs,
            seed: Some(7),
            report: None,
        }
    }

    const RULES: &str =
        r#"[{"condition": "department == 'HR'", "field": "email", "masking_type": "email"}]"#;
    const INPUT: &str = r#"[
        {"name": "A", "department": "HR", "email": "a@x.com"},
        {"name": "B", "department": "Sales", "email": "b@x.com"}
    ]"#;

    fn read_json(path: &Path) -> Value {
        let content = fs::read_to_string(path).expect("read output");
        serde_json::from_str(&content).expect("output json")
    }

    #[test]
    fn masks_matching_records_and_writes_output() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.json", RULES),
            scratch.write("in.json", INPUT),
        );

        let report = run_mask(&opts).expect("run");

        let output = read_json(&opts.output);
        assert_eq!(output[0]["name"], "A");
        assert_ne!(output[0]["email"], "a@x.com");
        assert_eq!(output[1], json!({"name": "B", "department": "Sales", "email": "b@x.com"}));
        assert_eq!(report.fields_masked(), 1);

        let raw = fs::read_to_string(&opts.output).expect("raw output");
        assert!(raw.starts_with("[\n    {\n        \"name\""));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let scratch = Scratch::new();
        let rules = scratch.write("rules.json", RULES);
        let input = scratch.write("in.json", INPUT);

        let first = options(&scratch, rules.clone(), input.clone());
        run_mask(&first).expect("first run");
        let first_output = fs::read(&first.output).expect("first output");

        let mut second = options(&scratch, rules, input);
        second.output = scratch.path("out2.json");
        run_mask(&second).expect("second run");

        assert_eq!(first_output, fs::read(&second.output).expect("second output"));
    }

    #[test]
    fn toml_rules_and_markdown_report() {
        let scratch = Scratch::new();
        let rules = scratch.write(
            "rules.toml",
            "[[rules]]\ncondition = \"department == 'HR'\"\nfield = \"email\"\nmasking_type = \"email\"\n",
        );
        let mut opts = options(&scratch, rules, scratch.write("in.json", INPUT));
        opts.report = Some(scratch.path("report.md"));

        run_mask(&opts).expect("run");

        let rendered = fs::read_to_string(scratch.path("report.md")).expect("report");
        assert!(rendered.contains("# Masking Report"));
        assert!(rendered.contains("- fields_masked: 1"));
    }

    #[test]
    fn json_report_carries_rule_statistics() {
        let scratch = Scratch::new();
        let mut opts = options(
            &scratch,
            scratch.write("rules.json", RULES),
            scratch.write("in.json", INPUT),
        );
        opts.report = Some(scratch.path("report.json"));

        run_mask(&opts).expect("run");

        let report = read_json(&scratch.path("report.json"));
        assert_eq!(report["records_in"], 2);
        assert_eq!(report["rules"][0]["matched"], 1);
    }

    #[test]
    fn malformed_rules_abort_without_output() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.json", "[{\"condition\": "),
            scratch.write("in.json", INPUT),
        );

        let err = run_mask(&opts).expect_err("malformed rules");

        assert!(matches!(err, CliError::Rules(RuleSetError::Json(_))));
        assert!(!opts.output.exists());
    }

    #[test]
    fn rule_missing_attribute_aborts_without_output() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.json", r#"[{"condition": "true", "field": "email"}]"#),
            scratch.write("in.json", INPUT),
        );

        let err = run_mask(&opts).expect_err("invalid rules");

        let CliError::Rules(RuleSetError::Invalid(report)) = err else {
            panic!("expected invalid rule set, got {err}");
        };
        assert!(report.has_code("attribute_missing"));
        assert!(!opts.output.exists());
    }

    #[test]
    fn non_object_record_aborts_without_output() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.json", RULES),
            scratch.write("in.json", r#"[{"name": "A"}, 3]"#),
        );

        let err = run_mask(&opts).expect_err("bad records");

        assert!(err.to_string().contains("record 1"));
        assert!(!opts.output.exists());
    }

    #[test]
    fn missing_input_file_fails() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.json", RULES),
            scratch.path("absent.json"),
        );

        assert!(matches!(run_mask(&opts), Err(CliError::Io(_))));
        assert!(!opts.output.exists());
    }

    #[test]
    fn wrong_extension_is_rejected_before_reading() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write("rules.yaml", RULES),
            scratch.write("in.json", INPUT),
        );

        assert!(matches!(run_mask(&opts), Err(CliError::Workspace(_))));
    }

    #[test]
    fn missing_target_field_completes_run() {
        let scratch = Scratch::new();
        let opts = options(
            &scratch,
            scratch.write(
                "rules.json",
                r#"[{"condition": "true", "field": "phone_number", "masking_type": "phone_number"}]"#,
            ),
            scratch.write("in.json", INPUT),
        );

        let report = run_mask(&opts).expect("run");

        assert_eq!(report.rules[0].missing_field, 2);
        assert_eq!(read_json(&opts.output), serde_json::from_str::<Value>(INPUT).expect("input"));
    }

    #[test]
    fn demo_files_mask_cleanly() {
        let scratch = Scratch::new();
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        for rules in ["rules.json", "rules.toml"] {
            let opts = options(&scratch, demos.join(rules), demos.join("input.json"));
            let report = run_mask(&opts).expect("demo run");
            assert_eq!(report.records_out, 4);
            assert_eq!(report.conditions_skipped(), 0);
        }
    }

    #[test]
    fn settings_fill_unset_flags() {
        let settings = MaskSettings {
            locale: Some("pt_BR".to_string()),
            seed: Some(9),
            report: Some(PathBuf::from("report.md")),
            log_format: None,
        };

        let resolved = MaskOptions::resolve(
            PathBuf::from("rules.json"),
            PathBuf::from("in.json"),
            PathBuf::from("out.json"),
            None,
            Some(1),
            None,
            settings,
        )
        .expect("resolve");

        assert_eq!(resolved.locale, LocaleKey::PtBr);
        assert_eq!(resolved.seed, Some(1));
        assert_eq!(resolved.report, Some(PathBuf::from("report.md")));
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let err = MaskOptions::resolve(
            PathBuf::from("rules.json"),
            PathBuf::from("in.json"),
            PathBuf::from("out.json"),
            Some("fr_FR".to_string()),
            None,
            None,
            MaskSettings::default(),
        )
        .expect_err("locale");
        assert!(matches!(err, CliError::Generation(_)));
    }

    #[test]
    fn validate_accepts_demo_rules() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        run_validate(&demos.join("rules.toml")).expect("valid rules");
    }

    #[test]
    fn schema_is_written_to_file() {
        let scratch = Scratch::new();
        let path = scratch.path("rules.schema.json");

        run_schema(Some(&path)).expect("schema");

        let schema = read_json(&path);
        assert_eq!(schema["type"], "array");
    }
}
