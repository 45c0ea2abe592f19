//! Daemon gateway trait and the request/response types it exchanges.
//!
//! The orchestrator only ever talks to the container daemon through
//! [`DaemonGateway`], which keeps the provisioning walk testable against an
//! in-memory daemon.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the daemon reports about an existing container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    /// Container ID.
    pub id: String,
    /// ID of the image the container was created from.
    pub image_id: String,
    /// Whether the container is currently running.
    pub running: bool,
}

/// What the daemon reports about a local image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image ID (e.g. `sha256:...`).
    pub id: String,
}

/// A published port binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Container port key, e.g. `80/tcp`.
    pub port: String,
    /// Host address.
    pub host_ip: String,
    /// Host port.
    pub host_port: String,
}

/// Host-side runtime options applied when a container runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    pub privileged: bool,
    pub port_bindings: Vec<PortBinding>,
    /// Bind strings, `host:container[:ro]`.
    pub binds: Vec<String>,
    pub volumes_from: Vec<String>,
    /// Link strings, `name:alias`.
    pub links: Vec<String>,
}

/// Options for creating a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    pub name: String,
    pub image: String,
    /// `KEY=VALUE` strings.
    pub env: Vec<String>,
    /// Exposed port keys, e.g. `80/tcp`.
    pub exposed_ports: Vec<String>,
    /// Declared volume paths inside the container.
    pub volumes: Vec<String>,
    /// Container whose volumes are inherited.
    pub volumes_from: Option<String>,
    /// Runtime options for daemons that only accept host configuration at
    /// creation time.
    pub host: RuntimeOptions,
}

/// Narrow capability surface of a container daemon.
///
/// Lookups report absence as `Ok(None)`; `Err` is reserved for failures.
#[async_trait]
pub trait DaemonGateway: Send + Sync {
    /// Returns the name of this gateway.
    fn name(&self) -> &'static str;

    /// Looks up a container by name.
    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerState>>;

    /// Resolves an image reference to a local image.
    async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>>;

    /// Creates a container.
    async fn create_container(&self, options: &CreateOptions) -> Result<()>;

    /// Starts a created container.
    async fn start_container(&self, name: &str, options: &RuntimeOptions) -> Result<()>;
}
