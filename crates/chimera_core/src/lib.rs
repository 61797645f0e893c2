//! # chimera_core
//!
//! Target expansion and the build/test pipeline for chimera.
//!
//! # Architecture
//!
//! - **Config**: the `.chimera.yml` document
//! - **Targets**: one per (image, tag) pair, each with a random id that
//!   namespaces its staging directory, archive, image and container
//! - **Pipeline**: takes each target through bundle → build → test → clean,
//!   stopping the whole run at the first failure
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chimera_core::{expand_targets, Config, Pipeline, RunContext};
//! use chimera_runner::DockerRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(".chimera.yml")?;
//! let context = RunContext::new(std::env::current_dir()?);
//! let targets = expand_targets(&config, &context);
//!
//! let runner = Arc::new(DockerRunner::connect(&config.docker).await?);
//! let summary = Pipeline::new(runner, context)?.run(targets).await?;
//! println!("{} target(s) passed", summary.len());
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod target;

pub use config::{Config, ImageDefinition, DEFAULT_CONFIG_FILE};
pub use context::RunContext;
pub use error::{CoreError, CoreResult};
pub use pipeline::{Pipeline, RunSummary, TargetReport, TargetStage};
pub use target::{expand_targets, Target, TargetId};
