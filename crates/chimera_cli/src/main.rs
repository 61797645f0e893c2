//! chimera CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Any failure
//! - 2: Invalid arguments (reported by clap)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        None | Some(Commands::Run) => commands::run::execute(&cli).await,
        Some(Commands::Generate(args)) => commands::generate::execute(&cli, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(ExitCodes::GENERAL_ERROR)
        }
    }
}

/// `RUST_LOG` wins; otherwise chimera crates log at info (debug with
/// `--verbose`) and everything else at warn.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        ["chimera_cli", "chimera_core", "chimera_runner", "chimera_templates"]
            .iter()
            .fold(EnvFilter::new("warn"), |filter, krate| {
                match format!("{}={}", krate, level).parse() {
                    Ok(directive) => filter.add_directive(directive),
                    Err(_) => filter,
                }
            })
    });

    // Already initialized is fine
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
