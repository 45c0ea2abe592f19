//! Docker daemon connection settings.

use serde::{Deserialize, Serialize};

/// Default timeout for a daemon round trip, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Docker daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Daemon address (`unix:///var/run/docker.sock`, `tcp://host:2375`).
    /// Falls back to `DOCKER_HOST` and then the local socket.
    pub host: Option<String>,

    /// Timeout for each daemon request in seconds.
    pub timeout_seconds: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            host: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}
