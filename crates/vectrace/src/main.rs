//! vectrace: run the staged vectorization pipeline once.
//!
//! Loads `config.json` (next to the executable unless `--config` is
//! given), prepares the run workspace, then runs input, canny, core and
//! svg2png in order. Any fatal error is logged once and the process exits
//! with status 1.
//!
//! # Usage
//!
//! ```text
//! vectrace [--config <PATH>] [--json] [-v]...
//! ```

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vectrace_harness::{
    Config, HarnessError, LogObserver, Pipeline, RunReport, RunTimer, StageRunner, StageSettings,
    StdClock, Workspace,
};

/// Staged batch harness around an external raster-to-vector engine.
#[derive(Parser)]
#[command(name = "vectrace", version)]
struct Cli {
    /// Configuration file. Defaults to `config.json` beside the executable.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the stage timing report as JSON (requires `options.timer`).
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config, HarnessError> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    tracing::debug!(path = %path.display(), "loading configuration");
    Ok(Config::load(&path)?)
}

/// Prepare the workspace and drive every stage.
fn run(config: &Config) -> Result<RunReport, HarnessError> {
    let workspace = Workspace::prepare(config, &chrono::Local::now())?;
    let mut runner = StageRunner::new(StageSettings::from(config), StdClock, LogObserver);

    let outcome = Pipeline::new(config, &workspace).run(&mut runner)?;
    tracing::info!(
        edges = %outcome.edges.path.display(),
        drawings = outcome.conversion.converted.len(),
        "run complete, logs in {}",
        workspace.log_dir().display()
    );
    Ok(runner.into_report())
}

fn print_report(report: &RunReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.render());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _total = RunTimer::start(config.options.timer, StdClock, LogObserver);

    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.options.timer
        && let Err(e) = print_report(&report, cli.json)
    {
        tracing::error!("cannot serialize report: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
