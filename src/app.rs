//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - loads `.env`
//! - parses CLI arguments
//! - sets up logging
//! - runs the pipeline and prints the report

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Command, DataArgs, RunArgs};
use crate::domain::{AnalysisConfig, DataSource, OutputFormat};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ivcig` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let dotenv = dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_logging(cli.verbose);
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Describe(args) => handle_describe(&args),
    }
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args);
    let analysis = pipeline::run_analysis(&config)?;
    let out = match config.format {
        OutputFormat::Text => crate::report::format_analysis(&analysis),
        OutputFormat::Json => crate::report::to_json(&analysis)?,
    };
    println!("{}", out.trim_end());
    Ok(())
}

fn handle_describe(args: &DataArgs) -> Result<(), AppError> {
    let config = data_config_from_args(args);
    let desc = pipeline::describe(&config)?;
    let out = match config.format {
        OutputFormat::Text => crate::report::format_description(&desc),
        OutputFormat::Json => serde_json::to_string_pretty(&desc)
            .map_err(|e| AppError::internal(format!("Failed to serialize summary: {e}")))?,
    };
    println!("{}", out.trim_end());
    Ok(())
}

pub fn data_config_from_args(args: &DataArgs) -> AnalysisConfig {
    AnalysisConfig {
        source: args
            .data
            .clone()
            .map_or(DataSource::Bundled, DataSource::Path),
        year: args.year,
        format: args.format,
        ..AnalysisConfig::default()
    }
}

pub fn run_config_from_args(args: &RunArgs) -> AnalysisConfig {
    AnalysisConfig {
        covariance: args.covariance,
        ..data_config_from_args(&args.data)
    }
}

/// `RUST_LOG` wins; otherwise the level follows `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // try_init: tests may already have installed a subscriber.
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Rewrite argv so `ivcig` defaults to `ivcig run`.
///
/// Rules:
/// - `ivcig`                       -> `ivcig run`
/// - `ivcig --year 1985 ...`       -> `ivcig run --year 1985 ...`
/// - `ivcig --help/--version/-h`   -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    if matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help") {
        return argv;
    }
    if matches!(arg1.as_str(), "run" | "describe") {
        return argv;
    }

    // Leading verbosity flags are global; look past them for a subcommand.
    let first_other = argv
        .iter()
        .skip(1)
        .position(|a| !is_verbosity_flag(a))
        .map(|i| i + 1);
    match first_other {
        Some(i) if matches!(argv[i].as_str(), "run" | "describe" | "help") => argv,
        Some(i) if argv[i].starts_with('-') => {
            argv.insert(i, "run".to_string());
            argv
        }
        Some(_) => argv,
        None => {
            argv.push("run".to_string());
            argv
        }
    }
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}
