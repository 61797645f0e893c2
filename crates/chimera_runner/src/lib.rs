//! # chimera_runner
//!
//! Container runtime client for chimera.
//!
//! This crate is a thin facade over the Docker Engine API: build an image
//! from a tar context, run it to completion, and remove what was created.
//!
//! # Features
//!
//! - **Docker API Runner**: [`DockerRunner`] built on bollard
//! - **Connection Options**: socket, HTTP host, or local defaults
//! - **Build Stream Evaluation**: errors anywhere in the build output fail the build
//! - **Mock Runner**: For testing without actual containers
//!
//! # Example
//!
//! ```rust,no_run
//! use chimera_runner::{ContainerConfig, ContainerRunner, DockerOptions, DockerRunner, RunConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = DockerRunner::connect(&DockerOptions::default()).await?;
//!
//!     let image = runner.build_image(Path::new("/tmp/context.tar"), "my-test").await?;
//!     let result = runner
//!         .run_container(&ContainerConfig::new(&image), &RunConfig::default().stream_logs(true))
//!         .await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     runner.remove_container(&result.container_id).await?;
//!     runner.remove_image(&image).await?;
//!     Ok(())
//! }
//! ```

pub mod build;
pub mod config;
pub mod docker;
pub mod error;
pub mod mock;
pub mod runner;

pub use build::{BuildLog, BuildMessage};
pub use config::{ContainerConfig, DockerOptions, Endpoint, RunConfig};
pub use docker::DockerRunner;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{ContainerRunner, ExecutionResult};
