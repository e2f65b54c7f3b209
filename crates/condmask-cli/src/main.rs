mod logging;
mod run;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use condmask_core::Error as CoreError;
use condmask_generate::GenerationError;
use condmask_rules::RuleSetError;
use logging::{LogFormat, init_logging};
use run::{MaskOptions, run_mask, run_schema, run_validate};
use thiserror::Error;
use workspace::{MaskSettings, WorkspaceError, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("rule set error: {0}")]
    Rules(#[from] RuleSetError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generator error: {0}")]
    Generation(#[from] GenerationError),
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "condmask", version, about = "Conditional field-level masking for JSON records")]
struct Cli {
    /// Encoding of log events on stderr (defaults to the settings file, then text).
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Also append JSON log events to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mask records according to a rule set.
    Mask(MaskArgs),
    /// Load and validate a rule set without masking anything.
    Validate(ValidateArgs),
    /// Print the JSON Schema of a rule file.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct MaskArgs {
    /// Rule set file (.json or .toml).
    #[arg(short = 'c', long = "config", value_name = "RULES")]
    rules: PathBuf,
    /// Input records (.json).
    #[arg(short, long)]
    input: PathBuf,
    /// Output records (.json).
    #[arg(short, long)]
    output: PathBuf,
    /// Faker locale: en_US or pt_BR.
    #[arg(long)]
    locale: Option<String>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Write a run report (.md renders markdown, anything else JSON).
    #[arg(long)]
    report: Option<PathBuf>,
    /// TOML file with defaults for the options above.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Rule set file (.json or .toml).
    #[arg(short = 'c', long = "config", value_name = "RULES")]
    rules: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Settings are read before logging starts since they may pick the format.
    let settings = match &cli.command {
        Command::Mask(args) => args.settings.as_deref().map(load_settings).transpose(),
        _ => Ok(None),
    };
    let log_format = cli
        .log_format
        .or_else(|| {
            settings
                .as_ref()
                .ok()
                .and_then(|settings| settings.as_ref())
                .and_then(|settings| settings.log_format)
        })
        .unwrap_or_default();

    if let Err(err) = init_logging(log_format, cli.log_file.as_deref()) {
        eprintln!("condmask: {err}");
        return ExitCode::FAILURE;
    }

    let result = settings
        .map_err(CliError::from)
        .and_then(|settings| dispatch(cli.command, settings.unwrap_or_default()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command, settings: MaskSettings) -> Result<(), CliError> {
    match command {
        Command::Mask(args) => {
            let options = MaskOptions::resolve(
                args.rules,
                args.input,
                args.output,
                args.locale,
                args.seed,
                args.report,
                settings,
            )?;
            run_mask(&options).map(|_| ())
        }
        Command::Validate(args) => run_validate(&args.rules),
        Command::Schema(args) => run_schema(args.out.as_deref()),
    }
}
