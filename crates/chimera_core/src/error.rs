//! Error types for the core module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while expanding or running targets.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to stage {path:?}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive {path:?}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tests failed on {image} (exit code {exit_code})")]
    TestsFailed { image: String, exit_code: i64 },

    #[error("Cleanup of {target} failed: {message}")]
    Cleanup { target: String, message: String },

    #[error("Runtime error: {0}")]
    Runner(#[from] chimera_runner::RunnerError),

    #[error("Template error: {0}")]
    Template(#[from] chimera_templates::TemplateError),
}
