use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rulecheck::cmd::{checks, validate};
use rulecheck::domain::report::{PipelineInput, PipelineInputSource, PipelineReport};
use rulecheck::io as rulecheck_io;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Parser)]
#[command(
    name = "rulecheck",
    version,
    about = "Data-quality rule execution CLI"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    emit_pipeline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute validation rules against a dataset file.
    Validate(ValidateArgs),
    /// List the supported check vocabulary.
    Checks,
}

#[derive(Debug, clap::Args)]
struct ValidateArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    rules: PathBuf,

    #[arg(long, default_value_t = false)]
    emit_notification: bool,
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
    code: i32,
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };

    let emit_pipeline = cli.emit_pipeline;
    match cli.command {
        Commands::Validate(args) => run_validate(args, emit_pipeline),
        Commands::Checks => run_checks(emit_pipeline),
    }
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => {
            emit_error("input_usage_error", error.to_string(), 3);
            3
        }
    }
}

fn run_validate(args: ValidateArgs, emit_pipeline: bool) -> i32 {
    let pipeline_report = build_validate_pipeline_report(&args);
    let command_args = validate::ValidateCommandArgs {
        input: args.input,
        rules: args.rules,
        emit_notification: args.emit_notification,
    };

    let response = validate::run(&command_args);

    let exit_code = match response.exit_code {
        0 | 2 => {
            if emit_json_stdout(&response.payload) {
                response.exit_code
            } else {
                emit_error(
                    "internal_error",
                    "failed to serialize validation response".to_string(),
                    1,
                );
                1
            }
        }
        _ => {
            emit_json_stderr(&response.payload);
            response.exit_code
        }
    };

    if let Some(notification) = &response.notification {
        emit_json_stderr(notification);
    }
    if emit_pipeline {
        emit_pipeline_report(&pipeline_report);
    }
    exit_code
}

fn run_checks(emit_pipeline: bool) -> i32 {
    let payload = checks::checks_help_payload();
    let exit_code = if emit_json_stdout(&payload) {
        0
    } else {
        emit_error(
            "internal_error",
            "failed to serialize checks payload".to_string(),
            1,
        );
        1
    };
    if emit_pipeline {
        let report = PipelineReport::new(
            "checks",
            PipelineInput::new(Vec::new()),
            vec!["checks_list_vocabulary".to_string()],
            vec!["checks_payload_order_stable".to_string()],
        );
        emit_pipeline_report(&report);
    }
    exit_code
}

fn build_validate_pipeline_report(args: &ValidateArgs) -> PipelineReport {
    let input_format = rulecheck_io::dataset_format_from_path(&args.input)
        .ok()
        .map(|format| format.as_str());
    let rules_format = rulecheck_io::rules_format_from_path(&args.rules)
        .ok()
        .map(|format| format.as_str());
    PipelineReport::new(
        "validate",
        PipelineInput::new(vec![
            PipelineInputSource::path(
                "dataset",
                args.input.to_string_lossy().into_owned(),
                input_format,
            ),
            PipelineInputSource::path(
                "rules",
                args.rules.to_string_lossy().into_owned(),
                rules_format,
            ),
        ]),
        validate::pipeline_steps(),
        validate::deterministic_guards(),
    )
}

fn emit_error(kind: &str, message: String, code: i32) {
    let error = CliError {
        error: kind,
        message,
        code,
    };
    if let Ok(line) = serde_json::to_string(&error) {
        eprintln!("{line}");
    }
}

fn emit_json_stdout(payload: &Value) -> bool {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match serde_json::to_string(payload) {
        Ok(line) => writeln!(handle, "{line}").is_ok(),
        Err(_) => false,
    }
}

fn emit_json_stderr(payload: &Value) {
    if let Ok(line) = serde_json::to_string(payload) {
        eprintln!("{line}");
    }
}

fn emit_pipeline_report(report: &PipelineReport) {
    if let Ok(line) = serde_json::to_string(&json!({"pipeline": report})) {
        eprintln!("{line}");
    }
}
