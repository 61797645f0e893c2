//! Image build output handling.

use bollard::models::BuildInfo;
use tracing::{debug, error};

use crate::error::{RunnerError, RunnerResult};

/// One entry of an image build's progress stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMessage {
    pub stream: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

impl BuildMessage {
    pub fn stream(text: impl Into<String>) -> Self {
        Self {
            stream: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self {
            status: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            error: Some(text.into()),
            ..Default::default()
        }
    }
}

impl From<BuildInfo> for BuildMessage {
    fn from(info: BuildInfo) -> Self {
        Self {
            stream: info.stream,
            status: info.status,
            error: info.error,
        }
    }
}

/// Accumulates build messages for one image.
///
/// Errors are remembered rather than returned immediately so the whole
/// stream gets drained and logged; the verdict comes from [`BuildLog::finish`].
#[derive(Debug)]
pub struct BuildLog {
    image: String,
    errors: Vec<String>,
    entries: usize,
}

impl BuildLog {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            errors: Vec::new(),
            entries: 0,
        }
    }

    /// Record one message from the stream.
    pub fn record(&mut self, message: BuildMessage) {
        self.entries += 1;

        if let Some(err) = message.error {
            error!("{}", err.trim_end());
            self.errors.push(err);
        } else if let Some(text) = message.stream.or(message.status) {
            let text = text.trim_end();
            if !text.is_empty() {
                debug!("Build: {}", text);
            }
        }
    }

    pub fn has_failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of messages recorded so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Resolve the build: the image name on success, or the first reported error.
    pub fn finish(self) -> RunnerResult<String> {
        match self.errors.first() {
            Some(first) => Err(RunnerError::BuildFailed(format!(
                "failed to build image {}: {}",
                self.image,
                first.trim_end()
            ))),
            None => Ok(self.image),
        }
    }
}
