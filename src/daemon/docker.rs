//! Docker Engine gateway.
//!
//! Talks to the Docker daemon through bollard. Host configuration is applied
//! when the container is created, as current Engine API versions ignore a
//! host configuration sent with the start request.

use crate::config::DockerConfig;
use crate::daemon::gateway::{
    ContainerState, CreateOptions, DaemonGateway, ImageInfo, RuntimeOptions,
};
use crate::error::{JunbanError, Result};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, StartContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{HostConfig, PortBinding};
use bollard::{Docker, API_DEFAULT_VERSION};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Gateway backed by a Docker daemon.
pub struct DockerGateway {
    docker: Docker,
}

impl DockerGateway {
    /// Connects to the daemon described by `config` and pings it.
    pub async fn connect(config: &DockerConfig) -> Result<Self> {
        let timeout = config.timeout_seconds;
        let docker = match config.host.as_deref() {
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_unix(host, timeout, API_DEFAULT_VERSION)
            }
            Some(host) => Docker::connect_with_http(host, timeout, API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(Duration::from_secs(timeout))),
        }
        .map_err(|e| JunbanError::daemon_with_source("Error creating Docker client", e))?;

        docker
            .ping()
            .await
            .map_err(|e| JunbanError::daemon_with_source("Error pinging Docker daemon", e))?;

        info!(
            host = config.host.as_deref().unwrap_or("local defaults"),
            "Connected to Docker daemon"
        );

        Ok(Self { docker })
    }
}

fn is_not_found(err: &BollardError) -> bool {
    matches!(
        err,
        BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// Translates runtime options into a Docker host configuration.
fn host_config(options: &RuntimeOptions) -> HostConfig {
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for binding in &options.port_bindings {
        port_bindings
            .entry(binding.port.clone())
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(PortBinding {
                host_ip: Some(binding.host_ip.clone()),
                host_port: Some(binding.host_port.clone()),
            });
    }

    HostConfig {
        privileged: Some(options.privileged),
        port_bindings: Some(port_bindings),
        binds: Some(options.binds.clone()),
        volumes_from: Some(options.volumes_from.clone()),
        links: Some(options.links.clone()),
        ..Default::default()
    }
}

/// Translates create options into a Docker container configuration.
fn container_config(options: &CreateOptions) -> Config<String> {
    let exposed_ports: HashMap<String, HashMap<(), ()>> = options
        .exposed_ports
        .iter()
        .map(|p| (p.clone(), HashMap::new()))
        .collect();

    let volumes: HashMap<String, HashMap<(), ()>> = options
        .volumes
        .iter()
        .map(|v| (v.clone(), HashMap::new()))
        .collect();

    Config {
        image: Some(options.image.clone()),
        env: Some(options.env.clone()),
        exposed_ports: Some(exposed_ports),
        volumes: Some(volumes),
        host_config: Some(host_config(&options.host)),
        ..Default::default()
    }
}

#[async_trait]
impl DaemonGateway for DockerGateway {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerState>> {
        match self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspect) => Ok(Some(ContainerState {
                id: inspect.id.unwrap_or_default(),
                image_id: inspect.image.unwrap_or_default(),
                running: inspect
                    .state
                    .and_then(|state| state.running)
                    .unwrap_or(false),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(JunbanError::daemon_with_source(
                format!("Error inspecting container {}", name),
                e,
            )),
        }
    }

    async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>> {
        match self.docker.inspect_image(reference).await {
            Ok(image) => Ok(Some(ImageInfo {
                id: image.id.unwrap_or_default(),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(JunbanError::daemon_with_source(
                format!("Error inspecting image {}", reference),
                e,
            )),
        }
    }

    async fn create_container(&self, options: &CreateOptions) -> Result<()> {
        let create = CreateContainerOptions {
            name: options.name.as_str(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(create), container_config(options))
            .await
            .map_err(|e| {
                JunbanError::daemon_with_source(
                    format!("Error creating container {}", options.name),
                    e,
                )
            })?;

        for warning in &response.warnings {
            warn!(container = %options.name, warning = %warning, "Daemon warning");
        }
        debug!(container = %options.name, id = %response.id, "Daemon created container");

        Ok(())
    }

    async fn start_container(&self, name: &str, options: &RuntimeOptions) -> Result<()> {
        debug!(
            container = %name,
            privileged = options.privileged,
            binds = options.binds.len(),
            links = options.links.len(),
            "Starting container with host configuration applied at creation"
        );

        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| {
                JunbanError::daemon_with_source(format!("Error starting container {}", name), e)
            })
    }
}
