//! Docker implementation of ContainerRunner.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::image::{BuildImageOptions, RemoveImageOptions};
use bollard::Docker;
use chrono::Utc;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::build::{BuildLog, BuildMessage};
use crate::config::{ContainerConfig, DockerOptions, Endpoint, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ContainerRunner, ExecutionResult};

/// Docker-based container runner.
pub struct DockerRunner {
    client: Docker,
}

impl DockerRunner {
    /// Connect using configured options and verify the engine answers.
    pub async fn connect(options: &DockerOptions) -> RunnerResult<Self> {
        let endpoint = options.endpoint()?;
        debug!("Connecting to Docker at {:?}", endpoint);

        let client = match &endpoint {
            Endpoint::LocalDefaults => Docker::connect_with_local_defaults()?,
            Endpoint::Socket(path) => {
                Docker::connect_with_socket(path, options.timeout, bollard::API_DEFAULT_VERSION)?
            }
            Endpoint::Http(address) => {
                Docker::connect_with_http(address, options.timeout, bollard::API_DEFAULT_VERSION)?
            }
        };

        client
            .ping()
            .await
            .map_err(|e| RunnerError::DockerNotAvailable(format!("{:?}: {}", endpoint, e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContainerRunner for DockerRunner {
    async fn build_image(&self, archive_path: &Path, tag: &str) -> RunnerResult<String> {
        info!("Building image {} from {:?}", tag, archive_path);

        let context = tokio::fs::read(archive_path).await?;

        let options = BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            rm: true,
            ..Default::default()
        };

        let mut stream = self.client.build_image(options, None, Some(context.into()));
        let mut log = BuildLog::new(tag);

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => log.record(BuildMessage::from(info)),
                Err(e) => {
                    return Err(RunnerError::BuildFailed(e.to_string()));
                }
            }
        }

        log.finish()
    }

    async fn run_container(
        &self,
        config: &ContainerConfig,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let started_at = Utc::now();

        debug!("Running container from image {}", config.image);

        let container_config = Config {
            image: Some(config.image.clone()),
            ..Default::default()
        };

        let container = self
            .client
            .create_container(None::<CreateContainerOptions<String>>, container_config)
            .await?;

        let container_id = container.id;

        self.client
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await?;

        // Forward output until the container exits; nothing is buffered
        if run_config.stream_logs {
            let log_options = LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                ..Default::default()
            };

            let mut log_stream = self.client.logs(&container_id, Some(log_options));
            while let Some(result) = log_stream.next().await {
                match result? {
                    LogOutput::StdOut { message } | LogOutput::Console { message } => {
                        std::io::stdout().write_all(&message)?
                    }
                    LogOutput::StdErr { message } => std::io::stderr().write_all(&message)?,
                    LogOutput::StdIn { .. } => {}
                }
            }
        }

        let mut wait_stream = self
            .client
            .wait_container(&container_id, None::<WaitContainerOptions<String>>);

        // Nonzero exits surface as a wait error carrying the code
        let exit_code = match wait_stream.next().await {
            Some(Ok(exit)) => exit.status_code,
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => return Err(RunnerError::ExecutionFailed(e.to_string())),
            None => {
                return Err(RunnerError::ExecutionFailed(
                    "Container wait returned no status".into(),
                ))
            }
        };

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        debug!(
            "Container {} exited with {} after {}ms",
            container_id, exit_code, duration_ms
        );

        Ok(ExecutionResult {
            container_id,
            exit_code,
            started_at,
            finished_at,
            duration_ms,
        })
    }

    async fn remove_container(&self, container_id: &str) -> RunnerResult<()> {
        debug!("Removing container {}", container_id);
        self.client
            .remove_container(
                container_id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await?;
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> RunnerResult<()> {
        debug!("Removing image {}", image);
        self.client
            .remove_image(
                image,
                Some(RemoveImageOptions {
                    force: true,
                    ..Default::default()
                }),
                None,
            )
            .await?;
        Ok(())
    }
}
