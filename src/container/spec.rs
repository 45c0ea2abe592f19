//! Container specification types.
//!
//! A [`ContainerSpec`] is the strongly-typed form of one entry in the
//! `containers` section of the configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host IP used when a port entry does not name one.
pub const DEFAULT_HOST_IP: &str = "0.0.0.0";

/// One declared container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Unique container name.
    pub name: String,
    /// Image reference (`name` or `name:tag`).
    pub image: String,
    /// Run the container in privileged mode.
    pub privileged: bool,
    /// Containers that must be provisioned before this one.
    pub dependencies: Vec<Dependency>,
    /// Environment variables, in declaration order.
    pub env: Vec<EnvVar>,
    /// Published ports.
    pub ports: Vec<PortMapping>,
    /// Host directories bind-mounted into the container.
    pub mounts: Vec<Mount>,
    /// Containers whose volumes are inherited.
    pub mount_from: Vec<String>,
}

impl ContainerSpec {
    /// Creates a spec with only a name and an image.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Adds a dependency whose alias is the target name.
    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::new(target));
        self
    }

    /// Names of every container this one must come after: dependencies
    /// followed by mount-from sources.
    pub fn upstream_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .map(|d| d.name.as_str())
            .chain(self.mount_from.iter().map(String::as_str))
    }
}

/// A dependency on another container, linked under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the container depended upon.
    pub name: String,
    /// Link alias inside the dependent container.
    pub alias: String,
}

impl Dependency {
    /// Creates a dependency aliased to its own name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    /// Creates a dependency with an explicit alias.
    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }

    /// Returns the `name:alias` link string.
    pub fn link(&self) -> String {
        format!("{}:{}", self.name, self.alias)
    }
}

/// An environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A published port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Host address to bind.
    pub host_ip: String,
    /// Port on the host.
    pub host_port: u16,
    /// Port inside the container.
    pub container_port: u16,
}

impl PortMapping {
    pub fn new(host_ip: impl Into<String>, host_port: u16, container_port: u16) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port,
            container_port,
        }
    }

    /// Publishes `port` on all host addresses under the same number.
    pub fn same(port: u16) -> Self {
        Self::new(DEFAULT_HOST_IP, port, port)
    }

    /// Returns the daemon's port key, e.g. `80/tcp`.
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }
}

/// Access mode of a bind mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountMode {
    /// Read-only.
    ReadOnly,
    /// Read-write.
    #[default]
    ReadWrite,
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountMode::ReadOnly => write!(f, "ro"),
            MountMode::ReadWrite => write!(f, "rw"),
        }
    }
}

/// A host directory bind-mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub host_dir: String,
    pub container_dir: String,
    pub mode: MountMode,
}

impl Mount {
    pub fn new(
        host_dir: impl Into<String>,
        container_dir: impl Into<String>,
        mode: MountMode,
    ) -> Self {
        Self {
            host_dir: host_dir.into(),
            container_dir: container_dir.into(),
            mode,
        }
    }

    /// Returns the bind string passed to the daemon.
    ///
    /// Read-write is the daemon default and carries no suffix.
    pub fn bind(&self) -> String {
        match self.mode {
            MountMode::ReadWrite => format!("{}:{}", self.host_dir, self.container_dir),
            MountMode::ReadOnly => format!("{}:{}:ro", self.host_dir, self.container_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_link() {
        assert_eq!(Dependency::new("db").link(), "db:db");
        assert_eq!(Dependency::with_alias("db", "database").link(), "db:database");
    }

    #[test]
    fn test_env_display() {
        assert_eq!(EnvVar::new("FOO", "a=b").to_string(), "FOO=a=b");
    }

    #[test]
    fn test_port_key() {
        assert_eq!(PortMapping::same(8080).port_key(), "8080/tcp");
        assert_eq!(PortMapping::same(8080).host_ip, DEFAULT_HOST_IP);
    }

    #[test]
    fn test_mount_bind() {
        let rw = Mount::new("/srv/data", "/data", MountMode::ReadWrite);
        assert_eq!(rw.bind(), "/srv/data:/data");

        let ro = Mount::new("/etc/app", "/config", MountMode::ReadOnly);
        assert_eq!(ro.bind(), "/etc/app:/config:ro");
    }

    #[test]
    fn test_upstream_names() {
        let mut spec = ContainerSpec::new("web", "nginx").depends_on("db");
        spec.mount_from.push("data".to_string());

        let names: Vec<&str> = spec.upstream_names().collect();
        assert_eq!(names, vec!["db", "data"]);
    }
}
