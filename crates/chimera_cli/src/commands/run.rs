//! Run command - Build and test every target.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use chimera_core::{expand_targets, Pipeline};
use chimera_runner::DockerRunner;

use super::Cli;

pub async fn execute(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    let project = cli
        .project
        .canonicalize()
        .with_context(|| format!("project directory {} not found", cli.project.display()))?;
    let mut context = cli.run_context();
    context.project_dir = project;

    let targets = expand_targets(&config, &context);
    if targets.is_empty() {
        warn!("No targets to run");
        return Ok(());
    }
    info!("Running {} target(s) from {}", targets.len(), cli.file.display());

    let runner = DockerRunner::connect(&config.docker)
        .await
        .context("could not connect to Docker")?;

    let pipeline = Pipeline::new(Arc::new(runner), context)?;
    let summary = pipeline.run(targets).await?;

    for report in &summary.reports {
        println!("✅ {} ({})", report.target, report.image);
    }
    Ok(())
}
