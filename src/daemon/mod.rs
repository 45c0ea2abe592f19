//! Daemon module - access to the container daemon.
//!
//! This module defines the gateway trait the orchestrator depends on and the
//! Docker implementation used by the CLI.

pub mod docker;
pub mod gateway;

#[cfg(test)]
pub(crate) mod fake;

pub use docker::DockerGateway;
pub use gateway::{
    ContainerState, CreateOptions, DaemonGateway, ImageInfo, PortBinding, RuntimeOptions,
};
