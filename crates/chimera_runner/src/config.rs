//! Connection and container configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// Default Docker Engine port for plain HTTP connections.
pub const DEFAULT_HTTP_PORT: u16 = 2375;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Docker Engine connection options, as written in the `docker` section
/// of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DockerOptions {
    /// Path to the engine's unix socket
    pub socket_path: Option<String>,
    /// Remote engine host name or address
    pub host: Option<String>,
    /// Remote engine port (default: 2375)
    pub port: Option<u16>,
    /// Remote protocol, only `http` is supported
    pub protocol: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for DockerOptions {
    fn default() -> Self {
        Self {
            socket_path: None,
            host: None,
            port: None,
            protocol: None,
            timeout: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Where the runner should connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `DOCKER_HOST` or the platform default socket.
    LocalDefaults,
    /// An explicit unix socket path.
    Socket(String),
    /// An `http://host:port` address.
    Http(String),
}

impl DockerOptions {
    pub fn socket(mut self, path: impl Into<String>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Resolve the options into a single endpoint.
    ///
    /// A host takes precedence over a socket path. Hosts may be bare names
    /// or already carry a `tcp://` or `http://` scheme.
    pub fn endpoint(&self) -> RunnerResult<Endpoint> {
        if let Some(host) = &self.host {
            let protocol = self.protocol.as_deref().unwrap_or("http");
            if protocol != "http" {
                return Err(RunnerError::UnsupportedConnection(format!(
                    "protocol '{}' (only http is supported)",
                    protocol
                )));
            }

            let bare = host
                .strip_prefix("tcp://")
                .or_else(|| host.strip_prefix("http://"))
                .unwrap_or(host);

            let address = if bare.contains(':') {
                format!("http://{}", bare)
            } else {
                format!("http://{}:{}", bare, self.port.unwrap_or(DEFAULT_HTTP_PORT))
            };
            return Ok(Endpoint::Http(address));
        }

        if let Some(path) = &self.socket_path {
            let path = path.strip_prefix("unix://").unwrap_or(path);
            return Ok(Endpoint::Socket(path.to_string()));
        }

        Ok(Endpoint::LocalDefaults)
    }
}

/// Container configuration.
///
/// Containers are left unnamed; the runtime assigns the id that cleanup
/// later removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image to run, with its default command
    pub image: String,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

/// Per-run output handling.
///
/// Container output is only ever forwarded, never kept in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Whether to forward container output while it runs
    pub stream_logs: bool,
}

impl RunConfig {
    /// Enable or disable log streaming.
    pub fn stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }
}
