//! Container module - the declared container model.
//!
//! This module holds the strongly-typed container specification and the
//! parsers for its short-hand configuration formats.

pub mod parse;
pub mod spec;

pub use spec::{ContainerSpec, Dependency, EnvVar, Mount, MountMode, PortMapping};
