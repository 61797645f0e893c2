//! Integration tests for the container runtime layer.
//!
//! These tests exercise the runner through the `ContainerRunner` trait
//! using the mock runner, so no Docker daemon is needed.

use std::sync::Arc;

use chimera_runner::{
    BuildMessage, ContainerConfig, ContainerRunner, DockerOptions, Endpoint, MockResponse,
    MockRunner, RunConfig, RunnerError,
};
use tempfile::NamedTempFile;

/// Test a full build → run → remove cycle through a trait object.
#[tokio::test]
async fn test_build_run_remove_cycle() {
    let mock = MockRunner::new()
        .with_build_messages(vec![
            BuildMessage::stream("Step 1/5 : FROM node:5\n"),
            BuildMessage::stream("Successfully built 0123456789ab\n"),
        ])
        .add_response(MockResponse::success("ok 1 env\nok 2 install\n"));
    let runner: Arc<dyn ContainerRunner> = Arc::new(mock.clone());
    let context = NamedTempFile::new().unwrap();

    let image = runner
        .build_image(context.path(), "node-5-0a1b2c3d4e")
        .await
        .unwrap();
    assert_eq!(image, "node-5-0a1b2c3d4e");

    let config = ContainerConfig::new(&image);
    let result = runner
        .run_container(&config, &RunConfig::default().stream_logs(true))
        .await
        .unwrap();
    assert!(result.success());
    assert!(result.container_id.starts_with("mock-"));

    runner.remove_container(&result.container_id).await.unwrap();
    runner.remove_image(&image).await.unwrap();

    assert!(mock.images().is_empty());
    assert!(mock.containers().is_empty());

    let methods: Vec<_> = mock.get_calls().into_iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec!["build_image", "run_container", "remove_container", "remove_image"]
    );
}

/// A build error followed by ordinary output still fails the build.
#[tokio::test]
async fn test_build_error_mid_stream() {
    let runner = MockRunner::new().with_build_messages(vec![
        BuildMessage::stream("Step 4/6 : RUN npm install\n"),
        BuildMessage::error("npm ERR! code ELIFECYCLE"),
        BuildMessage::status("Downloading"),
        BuildMessage::stream("Step 5/6\n"),
    ]);
    let context = NamedTempFile::new().unwrap();

    let result = runner.build_image(context.path(), "broken").await;

    match result {
        Err(RunnerError::BuildFailed(msg)) => {
            assert!(msg.contains("broken"));
            assert!(msg.contains("ELIFECYCLE"));
        }
        other => panic!("expected BuildFailed, got {:?}", other),
    }
}

/// Exit codes are reported, not turned into errors, by the runner.
#[tokio::test]
async fn test_nonzero_exit_is_reported() {
    let runner = MockRunner::new().with_responses(vec![
        MockResponse::success("pass"),
        MockResponse::failure(1, "not ok 3 install"),
    ]);
    let context = NamedTempFile::new().unwrap();
    runner.build_image(context.path(), "img").await.unwrap();

    let config = ContainerConfig::new("img");
    let first = runner.run_container(&config, &RunConfig::default()).await.unwrap();
    let second = runner.run_container(&config, &RunConfig::default()).await.unwrap();

    assert!(first.success());
    assert!(!second.success());
    assert_eq!(second.exit_code, 1);
    assert_ne!(first.container_id, second.container_id);
}

/// Test call tracking with counter.
#[tokio::test]
async fn test_call_tracking() {
    let runner = MockRunner::new();

    let _ = runner.remove_container("never-created").await;
    let _ = runner.remove_image("never-built").await;

    assert_eq!(runner.call_count(), 2);
    assert!(runner.was_called("remove_image"));
    assert!(!runner.was_called("build_image"));
    assert_eq!(
        runner.get_method_calls("remove_container")[0].subject.as_deref(),
        Some("never-created")
    );
}

/// Test global failure simulation.
#[tokio::test]
async fn test_mock_runner_failure_simulation() {
    let runner = MockRunner::new().simulate_failure("daemon went away");
    let context = NamedTempFile::new().unwrap();

    let result = runner.build_image(context.path(), "img").await;

    if let Err(RunnerError::ExecutionFailed(msg)) = result {
        assert!(msg.contains("daemon"));
    } else {
        panic!("Expected ExecutionFailed error");
    }
}

/// Connection options are read with the same keys the config file uses.
#[test]
fn test_docker_options_from_yaml() {
    let yaml = r#"
socketPath: /var/run/docker.sock
host: 192.168.99.100
port: 2376
timeout: 30
"#;
    let options: DockerOptions = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(options.socket_path.as_deref(), Some("/var/run/docker.sock"));
    assert_eq!(options.timeout, 30);
    assert_eq!(
        options.endpoint().unwrap(),
        Endpoint::Http("http://192.168.99.100:2376".to_string())
    );
}

/// Missing connection options fall back to local defaults.
#[test]
fn test_docker_options_empty_yaml() {
    let options: DockerOptions = serde_yaml::from_str("{}").unwrap();

    assert_eq!(options, DockerOptions::default());
    assert_eq!(options.timeout, 120);
    assert_eq!(options.endpoint().unwrap(), Endpoint::LocalDefaults);
}
