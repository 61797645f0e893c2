//! Per-target build and test pipeline.
//!
//! Every target goes through `bundle → build → test → clean` in order.
//! Targets run one after another and the first failure stops the run.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use chimera_runner::{ContainerConfig, ContainerRunner, ExecutionResult, RunConfig};
use chimera_templates::DockerfileTemplate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::bundle;
use crate::context::RunContext;
use crate::error::{CoreError, CoreResult};
use crate::target::Target;

/// Lifecycle of a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStage {
    Expanded,
    Bundled,
    Built,
    Tested,
    Cleaned,
}

impl fmt::Display for TargetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expanded => "expanded",
            Self::Bundled => "bundled",
            Self::Built => "built",
            Self::Tested => "tested",
            Self::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}

/// Outcome of one target that went all the way through.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// `name:tag`
    pub target: String,
    pub image: String,
    pub stage: TargetStage,
    pub exit_code: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<TargetReport>,
}

impl RunSummary {
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Drives targets through the runtime.
pub struct Pipeline {
    runner: Arc<dyn ContainerRunner>,
    context: RunContext,
    dockerfile: DockerfileTemplate,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn ContainerRunner>, context: RunContext) -> CoreResult<Self> {
        Ok(Self {
            runner,
            context,
            dockerfile: DockerfileTemplate::new()?,
        })
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run every target in order, stopping at the first failure.
    pub async fn run(&self, targets: Vec<Target>) -> CoreResult<RunSummary> {
        let mut summary = RunSummary::default();

        for mut target in targets {
            info!("Executing target {}", target);
            let report = self.run_target(&mut target).await?;
            summary.reports.push(report);
        }

        info!("{} target(s) passed", summary.len());
        Ok(summary)
    }

    /// Take one target through every stage.
    ///
    /// A failing stage stops the target where it is; later stages,
    /// including cleanup, do not run.
    pub async fn run_target(&self, target: &mut Target) -> CoreResult<TargetReport> {
        let started_at = Utc::now();
        let mut stage = TargetStage::Expanded;

        let result = async {
            self.bundle(target).await?;
            stage = TargetStage::Bundled;

            self.build(target).await?;
            stage = TargetStage::Built;

            let execution = self.test(target).await?;
            stage = TargetStage::Tested;

            self.clean(target).await?;
            stage = TargetStage::Cleaned;

            Ok::<_, CoreError>(execution)
        }
        .await;

        match result {
            Ok(execution) => Ok(TargetReport {
                target: target.label(),
                image: target.image().to_string(),
                stage,
                exit_code: execution.exit_code,
                started_at,
                finished_at: Utc::now(),
            }),
            Err(e) => {
                error!("Target {} failed after stage '{}': {}", target, stage, e);
                Err(e)
            }
        }
    }

    /// Stage the target and write its build context archive.
    pub async fn bundle(&self, target: &Target) -> CoreResult<()> {
        debug!("Bundling {} in {:?}", target, target.staging_dir());
        bundle::bundle(target, self.context.project_dir(), &self.dockerfile).await
    }

    /// Build the target's image from its archive.
    pub async fn build(&self, target: &Target) -> CoreResult<()> {
        self.runner
            .build_image(target.archive_path(), target.image())
            .await?;
        info!("Built image {}", target.image());
        Ok(())
    }

    /// Run the built image and require a zero exit status.
    ///
    /// The container is left unnamed; its id is recorded on the target
    /// either way so that it can be removed later.
    pub async fn test(&self, target: &mut Target) -> CoreResult<ExecutionResult> {
        let config = ContainerConfig::new(target.image());
        let run_config = RunConfig::default().stream_logs(self.context.stream_output);

        let execution = self.runner.run_container(&config, &run_config).await?;
        target.set_container_id(&execution.container_id);

        if !execution.success() {
            return Err(CoreError::TestsFailed {
                image: target.image().to_string(),
                exit_code: execution.exit_code,
            });
        }

        info!(
            "Tests passed on {} in {}ms",
            target.image(),
            execution.duration_ms
        );
        Ok(execution)
    }

    /// Remove the staging directory, archive, container and image.
    ///
    /// All four removals are attempted concurrently; the first failure is
    /// returned once they have all finished.
    pub async fn clean(&self, target: &Target) -> CoreResult<()> {
        let label = target.label();
        let cleanup_error = |what: &str, e: &dyn fmt::Display| CoreError::Cleanup {
            target: label.clone(),
            message: format!("{}: {}", what, e),
        };

        let staging = async {
            remove_path(target.staging_dir(), true)
                .await
                .map_err(|e| cleanup_error("staging directory", &e))
        };
        let archive = async {
            remove_path(target.archive_path(), false)
                .await
                .map_err(|e| cleanup_error("archive", &e))
        };
        let container = async {
            match target.container_id() {
                Some(id) => self
                    .runner
                    .remove_container(id)
                    .await
                    .map_err(|e| cleanup_error("container", &e)),
                None => Ok(()),
            }
        };
        let image = async {
            self.runner
                .remove_image(target.image())
                .await
                .map_err(|e| cleanup_error("image", &e))
        };

        let (staging, archive, container, image) = tokio::join!(staging, archive, container, image);

        let results = [staging, archive, container, image];
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            warn!("{}", err);
        }

        for result in results {
            result?;
        }

        debug!("Cleaned up {}", target);
        Ok(())
    }
}

/// Remove a file or directory tree; a missing path is not an error.
async fn remove_path(path: &Path, is_dir: bool) -> io::Result<()> {
    let result = if is_dir {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
