//! CLI command definitions.
//!
//! Global flags locate the config and project and pick targets; the
//! subcommand decides what to do with them. `run` is the default.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use chimera_core::{Config, RunContext, DEFAULT_CONFIG_FILE};

pub mod generate;
pub mod run;

/// chimera - test a project against many Docker images
#[derive(Parser, Debug)]
#[command(name = "chimera")]
#[command(version, disable_version_flag = true)]
#[command(about = "chimera - run a project's tests in multiple Docker images")]
#[command(long_about = r#"
chimera builds one Docker image per (image, tag) pair listed in the config,
runs the project's test script inside each and removes everything it created
once the tests pass.

COMMANDS:
  run                  → Build and test every target (default)
  generate <service>   → Print a CI config with one job per target

EXIT CODES:
  0 - Success
  1 - Any failure (config, build, tests, cleanup)
  2 - Invalid arguments
"#)]
pub struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Path to the config file
    #[arg(
        short = 'f',
        long = "file",
        visible_alias = "config",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub file: PathBuf,

    /// Project directory copied into every image
    #[arg(short = 'p', long = "project", default_value = "./", global = true)]
    pub project: PathBuf,

    /// Only run targets whose name or name:tag starts with this
    #[arg(short = 't', long = "target", env = "CHIMERA_TARGET", global = true)]
    pub target: Option<String>,

    /// Enable debug output
    #[arg(short = 'V', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Build and test every target
    Run,

    /// Print a CI config whose matrix runs one target per job
    Generate(generate::GenerateArgs),
}

impl Cli {
    /// Read the config file named by `--file`.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        use anyhow::Context;

        Config::load(&self.file)
            .with_context(|| format!("could not load config from {}", self.file.display()))
    }

    pub fn run_context(&self) -> RunContext {
        RunContext::new(&self.project).target_filter(self.target.clone())
    }
}
