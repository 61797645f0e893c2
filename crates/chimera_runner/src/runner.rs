//! Container runner trait and types.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ContainerConfig, RunConfig};
use crate::error::RunnerResult;

/// Result of container execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Container ID
    pub container_id: String,
    /// Exit code from the container
    pub exit_code: i64,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Container runner trait.
///
/// The pipeline only ever talks to the runtime through this trait, so the
/// Docker implementation and the mock are interchangeable.
#[async_trait]
pub trait ContainerRunner: Send + Sync {
    /// Build an image from a tar build context and tag it.
    ///
    /// Fails if the build output reports an error at any point, even when
    /// the output continues afterwards.
    async fn build_image(&self, archive_path: &Path, tag: &str) -> RunnerResult<String>;

    /// Create, start and wait for a container.
    ///
    /// Output is forwarded while the container runs, never buffered. A
    /// nonzero exit code is not an error here; callers inspect
    /// [`ExecutionResult::exit_code`].
    async fn run_container(
        &self,
        config: &ContainerConfig,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult>;

    /// Remove a stopped container.
    async fn remove_container(&self, container_id: &str) -> RunnerResult<()>;

    /// Remove an image.
    async fn remove_image(&self, image: &str) -> RunnerResult<()>;
}
