//! The `quell` binary: detect and cancel duplicate tickets.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use quell_core::config::QuellConfig;
use quell_core::errors::RunError;
use quell_core::types::RunStats;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod run;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    init_tracing(args.debug);

    match execute(&args) {
        Ok(stats) => {
            println!("{stats}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &cli::Cli) -> Result<RunStats, RunError> {
    let overrides = args.overrides();
    let config = QuellConfig::load(Path::new("."), Some(&overrides))?;
    let client = client::JiraClient::from_env(config.scan.max_results)
        .map_err(RunError::Config)?;

    let options = run::RunOptions {
        projects: args.projects.clone(),
        dry_run: args.dry_run,
        force: args.force,
    };
    run::run(&client, &config, &options)
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
