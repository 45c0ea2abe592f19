//! Parsers for the short-hand entry formats of the configuration file.
//!
//! Each parser takes the entry's position in its list so that error messages
//! can point at the offending element.

use super::spec::{Dependency, EnvVar, Mount, MountMode, PortMapping, DEFAULT_HOST_IP};

/// Parses a dependency entry: `name` or `name:alias`.
pub fn parse_dependency(index: usize, entry: &str) -> Result<Dependency, String> {
    let parts: Vec<&str> = entry.split(':').collect();
    match parts.as_slice() {
        [name] => Ok(Dependency::new(*name)),
        [name, alias] => Ok(Dependency::with_alias(*name, *alias)),
        _ => Err(format!("Unknown format for dependency entry {}", index)),
    }
}

/// Parses an environment entry: `KEY=VALUE`, split on the first `=`.
pub fn parse_env(index: usize, entry: &str) -> Result<EnvVar, String> {
    entry
        .split_once('=')
        .map(|(key, value)| EnvVar::new(key, value))
        .ok_or_else(|| format!("Env entry {} not in form KEY=VAL", index))
}

/// Parses a bare integer port entry.
pub fn parse_port_number(index: usize, port: i64) -> Result<PortMapping, String> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(PortMapping::same(p)),
        _ => Err(format!("Port {} out of range: {}", index, port)),
    }
}

/// Parses a string port entry: `port`, `host:container`, `ip:host:container`
/// or `ip::container`.
pub fn parse_port(index: usize, entry: &str) -> Result<PortMapping, String> {
    let parts: Vec<&str> = entry.split(':').collect();
    match parts.as_slice() {
        [port] => {
            let port = port_number(index, port)?;
            Ok(PortMapping::same(port))
        }
        [host, container] => Ok(PortMapping::new(
            DEFAULT_HOST_IP,
            port_number(index, host)?,
            port_number(index, container)?,
        )),
        [ip, host, container] => {
            let container = port_number(index, container)?;
            // An empty host port publishes under the container port.
            let host = if host.is_empty() {
                container
            } else {
                port_number(index, host)?
            };
            Ok(PortMapping::new(*ip, host, container))
        }
        _ => Err(format!("Unknown port format for port {}", index)),
    }
}

fn port_number(index: usize, value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err(format!("Port {} out of range: 0", index)),
        Ok(port) => Ok(port),
        Err(e) => Err(format!("Invalid port '{}' for port {}: {}", value, index, e)),
    }
}

/// Parses a mount entry: `/host/dir:/container/dir[:ro|rw]`.
pub fn parse_mount(index: usize, entry: &str) -> Result<Mount, String> {
    let parts: Vec<&str> = entry.split(':').collect();
    match parts.as_slice() {
        [host, container] => Ok(Mount::new(*host, *container, MountMode::ReadWrite)),
        [host, container, mode] => {
            let mode = match *mode {
                "rw" => MountMode::ReadWrite,
                "ro" => MountMode::ReadOnly,
                other => {
                    return Err(format!(
                        "Mount entry {} has invalid mount type: {}",
                        index, other
                    ))
                }
            };
            Ok(Mount::new(*host, *container, mode))
        }
        _ => Err(format!(
            "Mount entry {} not in form /host/dir:/container/dir[:type]",
            index
        )),
    }
}
