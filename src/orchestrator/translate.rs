//! Translation of container specs into daemon request options.

use crate::container::ContainerSpec;
use crate::daemon::{CreateOptions, PortBinding, RuntimeOptions};
use std::collections::HashSet;
use tracing::warn;

/// Builds the options for creating `spec`'s container.
///
/// Only the last `mount-from` entry is honored at creation; a warning is
/// logged when more than one is given.
pub fn create_options(spec: &ContainerSpec) -> CreateOptions {
    if spec.mount_from.len() > 1 {
        warn!(
            container = %spec.name,
            entries = spec.mount_from.len(),
            "Currently only support one 'mount-from'. The last entry will be used."
        );
    }
    let volumes_from = spec.mount_from.last().cloned();

    let mut seen = HashSet::with_capacity(spec.ports.len());
    let exposed_ports: Vec<String> = spec
        .ports
        .iter()
        .map(|p| p.port_key())
        .filter(|key| seen.insert(key.clone()))
        .collect();

    let mut host = runtime_options(spec);
    host.volumes_from = volumes_from.iter().cloned().collect();

    CreateOptions {
        name: spec.name.clone(),
        image: spec.image.clone(),
        env: spec.env.iter().map(ToString::to_string).collect(),
        exposed_ports,
        volumes: spec.mounts.iter().map(|m| m.container_dir.clone()).collect(),
        volumes_from,
        host,
    }
}

/// Builds the runtime options for starting `spec`'s container.
pub fn runtime_options(spec: &ContainerSpec) -> RuntimeOptions {
    RuntimeOptions {
        privileged: spec.privileged,
        port_bindings: spec
            .ports
            .iter()
            .map(|p| PortBinding {
                port: p.port_key(),
                host_ip: p.host_ip.clone(),
                host_port: p.host_port.to_string(),
            })
            .collect(),
        binds: spec.mounts.iter().map(|m| m.bind()).collect(),
        volumes_from: spec.mount_from.clone(),
        links: spec.dependencies.iter().map(|d| d.link()).collect(),
    }
}
