//! Per-invocation run context.

use std::path::{Path, PathBuf};

/// Everything a run needs besides the config and the runtime connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Project directory copied into every image
    pub project_dir: PathBuf,
    /// Directory holding staging dirs and archives
    pub work_dir: PathBuf,
    /// Only run targets whose `name` or `name:tag` starts with this
    pub target_filter: Option<String>,
    /// Forward container output to the terminal while tests run
    pub stream_output: bool,
}

impl RunContext {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            work_dir: std::env::temp_dir(),
            target_filter: None,
            stream_output: true,
        }
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn target_filter(mut self, filter: Option<String>) -> Self {
        self.target_filter = filter.filter(|f| !f.is_empty());
        self
    }

    pub fn stream_output(mut self, enabled: bool) -> Self {
        self.stream_output = enabled;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
