//! Mock container runner for testing.
//!
//! Provides a configurable mock implementation of the ContainerRunner trait
//! for use in unit tests without requiring a Docker daemon. It keeps track of
//! which images and containers "exist" so tests can check that cleanup
//! removes exactly what a run created.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::build::{BuildLog, BuildMessage};
use crate::config::{ContainerConfig, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ContainerRunner, ExecutionResult};

/// Predefined mock response for a container execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    /// Printed when the run streams its logs
    pub output: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: output.into(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i64, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            duration_ms: 100,
        }
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: String,
    /// Image, container id or archive path the call was about
    pub subject: Option<String>,
    /// Image tag, when relevant
    pub detail: Option<String>,
}

impl CapturedCall {
    fn new(method: &str, subject: Option<String>, detail: Option<String>) -> Self {
        Self {
            method: method.to_string(),
            subject,
            detail,
        }
    }
}

/// Mock container runner for testing.
#[derive(Clone)]
pub struct MockRunner {
    /// Build output replayed on every build_image call.
    build_messages: Arc<RwLock<Vec<BuildMessage>>>,
    /// Predefined responses for run_container calls.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next response to return.
    response_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Configs passed to run_container, in call order.
    run_requests: Arc<RwLock<Vec<(ContainerConfig, RunConfig)>>>,
    /// Images that "exist".
    images: Arc<RwLock<HashSet<String>>>,
    /// Containers that "exist".
    containers: Arc<RwLock<HashSet<String>>>,
    /// Simulated failures keyed by method name; `*` applies to every method.
    failures: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            build_messages: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            run_requests: Arc::new(RwLock::new(Vec::new())),
            images: Arc::new(RwLock::new(HashSet::new())),
            containers: Arc::new(RwLock::new(HashSet::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the build output replayed by build_image.
    pub fn with_build_messages(self, messages: Vec<BuildMessage>) -> Self {
        *self.build_messages.write() = messages;
        self
    }

    /// Add a mock response for the next run_container call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Make every call fail with the given message.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        self.failures.write().insert("*".to_string(), message.into());
        self
    }

    /// Make calls to one method fail with the given message.
    pub fn simulate_failure_on(self, method: &str, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .insert(method.to_string(), message.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Check if a specific method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.method == method)
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Container and run configs received by run_container.
    pub fn run_requests(&self) -> Vec<(ContainerConfig, RunConfig)> {
        self.run_requests.read().clone()
    }

    /// Images currently present.
    pub fn images(&self) -> Vec<String> {
        let mut images: Vec<_> = self.images.read().iter().cloned().collect();
        images.sort();
        images
    }

    /// Containers currently present.
    pub fn containers(&self) -> Vec<String> {
        let mut containers: Vec<_> = self.containers.read().iter().cloned().collect();
        containers.sort();
        containers
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    fn check_failure(&self, method: &str) -> RunnerResult<()> {
        let failures = self.failures.read();
        if let Some(msg) = failures.get(method).or_else(|| failures.get("*")) {
            return Err(RunnerError::ExecutionFailed(msg.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRunner for MockRunner {
    async fn build_image(&self, archive_path: &Path, tag: &str) -> RunnerResult<String> {
        self.record_call(CapturedCall::new(
            "build_image",
            Some(archive_path.to_string_lossy().to_string()),
            Some(tag.to_string()),
        ));
        self.check_failure("build_image")?;

        if !archive_path.exists() {
            return Err(RunnerError::BuildFailed(format!(
                "build context {:?} does not exist",
                archive_path
            )));
        }

        let mut log = BuildLog::new(tag);
        for message in self.build_messages.read().iter().cloned() {
            log.record(message);
        }
        let image = log.finish()?;

        self.images.write().insert(image.clone());
        Ok(image)
    }

    async fn run_container(
        &self,
        config: &ContainerConfig,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        self.record_call(CapturedCall::new(
            "run_container",
            Some(config.image.clone()),
            None,
        ));
        self.run_requests.write().push((config.clone(), *run_config));
        self.check_failure("run_container")?;

        if !self.images.read().contains(&config.image) {
            return Err(RunnerError::ImageNotFound(config.image.clone()));
        }

        let response = self.next_response();
        if run_config.stream_logs {
            print!("{}", response.output);
        }
        let container_id = format!("mock-{}", uuid::Uuid::new_v4());
        self.containers.write().insert(container_id.clone());

        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        Ok(ExecutionResult {
            container_id,
            exit_code: response.exit_code,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        })
    }

    async fn remove_container(&self, container_id: &str) -> RunnerResult<()> {
        self.record_call(CapturedCall::new(
            "remove_container",
            Some(container_id.to_string()),
            None,
        ));
        self.check_failure("remove_container")?;

        if !self.containers.write().remove(container_id) {
            return Err(RunnerError::ContainerNotFound(container_id.to_string()));
        }
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> RunnerResult<()> {
        self.record_call(CapturedCall::new(
            "remove_image",
            Some(image.to_string()),
            None,
        ));
        self.check_failure("remove_image")?;

        if !self.images.write().remove(image) {
            return Err(RunnerError::ImageNotFound(image.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[tokio::test]
    async fn test_build_registers_image() {
        let runner = MockRunner::new();
        let context = archive();

        let image = runner.build_image(context.path(), "node-4-aa").await.unwrap();

        assert_eq!(image, "node-4-aa");
        assert_eq!(runner.images(), vec!["node-4-aa".to_string()]);
    }

    #[tokio::test]
    async fn test_build_error_in_stream_fails() {
        let runner = MockRunner::new().with_build_messages(vec![
            BuildMessage::stream("Step 1/2"),
            BuildMessage::error("no such image"),
            BuildMessage::stream("Step 2/2"),
        ]);
        let context = archive();

        let result = runner.build_image(context.path(), "node-4-aa").await;

        assert!(matches!(result, Err(RunnerError::BuildFailed(_))));
        assert!(runner.images().is_empty());
    }

    #[tokio::test]
    async fn test_run_requires_built_image() {
        let runner = MockRunner::new();
        let result = runner
            .run_container(&ContainerConfig::new("missing"), &RunConfig::default())
            .await;

        assert!(matches!(result, Err(RunnerError::ImageNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_and_remove_container() {
        let runner = MockRunner::new().add_response(MockResponse::failure(2, "1 failing"));
        let context = archive();
        runner.build_image(context.path(), "img").await.unwrap();

        let result = runner
            .run_container(&ContainerConfig::new("img"), &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert_eq!(runner.containers(), vec![result.container_id.clone()]);

        runner.remove_container(&result.container_id).await.unwrap();
        assert!(runner.containers().is_empty());

        let again = runner.remove_container(&result.container_id).await;
        assert!(matches!(again, Err(RunnerError::ContainerNotFound(_))));
    }

    #[tokio::test]
    async fn test_failure_on_single_method() {
        let runner = MockRunner::new().simulate_failure_on("remove_image", "image in use");
        let context = archive();

        assert!(runner.build_image(context.path(), "img").await.is_ok());
        let result = runner.remove_image("img").await;
        match result {
            Err(RunnerError::ExecutionFailed(msg)) => assert_eq!(msg, "image in use"),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
        assert_eq!(runner.images(), vec!["img".to_string()]);
    }

    #[tokio::test]
    async fn test_run_requests_are_recorded() {
        let runner = MockRunner::new();
        let context = archive();
        runner.build_image(context.path(), "img").await.unwrap();

        let run_config = RunConfig::default().stream_logs(true);
        runner
            .run_container(&ContainerConfig::new("img"), &run_config)
            .await
            .unwrap();

        assert_eq!(
            runner.run_requests(),
            vec![(ContainerConfig::new("img"), run_config)]
        );
    }
}
