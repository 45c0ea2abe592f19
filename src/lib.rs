//! junban - Dependency-ordered container provisioning
//!
//! This crate creates and starts a set of Docker containers declared in a
//! YAML file, in an order where every container comes after the containers
//! it depends on or mounts volumes from.
//!
//! # Overview
//!
//! A run goes through three stages:
//!
//! 1. The `containers` section is decoded into [`ContainerSpec`]s.
//! 2. A [`graph::DependencyGraph`] is built over the specs and sorted into an
//!    [`OrderedPlan`]. Unknown references and cycles are rejected here, before
//!    the daemon is contacted.
//! 3. The [`Orchestrator`] walks the plan for the Create or Start phase
//!    against a [`DaemonGateway`], skipping containers that are already in
//!    the desired state.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration file parsing and validation
//! - [`container`] - Container specifications and field parsing
//! - [`daemon`] - Container daemon gateway and its Docker implementation
//! - [`error`] - Error types and error handling
//! - [`graph`] - Dependency graph and topological sort
//! - [`orchestrator`] - Create and Start phases

pub mod cli;
pub mod config;
pub mod container;
pub mod daemon;
pub mod error;
pub mod graph;
pub mod orchestrator;

// Re-exports for convenience
pub use cli::Cli;
pub use config::Config;
pub use container::ContainerSpec;
pub use daemon::{DaemonGateway, DockerGateway};
pub use error::{ErrorCategory, JunbanError, Result};
pub use graph::{DependencyGraph, OrderedPlan};
pub use orchestrator::{Orchestrator, Phase, RunOptions, RunReport};
