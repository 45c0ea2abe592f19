//! Container entries of the configuration file.
//!
//! An entry is either a bare image reference or a full definition; both are
//! decoded into a [`ContainerSpec`].

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::container::parse::{
    parse_dependency, parse_env, parse_mount, parse_port, parse_port_number,
};
use crate::container::ContainerSpec;
use crate::error::JunbanError;

/// One entry of the `containers` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContainerEntry {
    /// `name: image`
    ImageOnly(String),
    /// `name: { image: ..., dependencies: [...], ... }`
    FullSpec(ContainerDefinition),
}

impl<'de> Deserialize<'de> for ContainerEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(image) => Ok(ContainerEntry::ImageOnly(image)),
            value @ Value::Mapping(_) => serde_yaml::from_value(value)
                .map(ContainerEntry::FullSpec)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "Unknown type for container entry: {}",
                value_kind(&other)
            ))),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Decodes the `containers` section, rejecting a name declared twice.
pub(crate) fn deserialize_containers<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ContainerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ContainersVisitor;

    impl<'de> Visitor<'de> for ContainersVisitor {
        type Value = BTreeMap<String, ContainerEntry>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of container names to entries")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut containers = BTreeMap::new();
            while let Some(name) = map.next_key::<String>()? {
                if containers.contains_key(&name) {
                    return Err(de::Error::custom(JunbanError::DuplicateName { name }));
                }
                let entry = map.next_value::<ContainerEntry>()?;
                containers.insert(name, entry);
            }
            Ok(containers)
        }
    }

    deserializer.deserialize_map(ContainersVisitor)
}

/// Full container definition. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ContainerDefinition {
    /// Image reference.
    pub image: String,

    /// Dependencies, `name` or `name:alias`.
    pub dependencies: Vec<String>,

    /// Environment, `KEY=VALUE`.
    pub env: Vec<String>,

    /// Published ports.
    pub ports: Vec<PortEntry>,

    /// Bind mounts, `/host:/container[:ro|rw]`.
    pub mount: Vec<String>,

    /// Containers to inherit volumes from.
    pub mount_from: Vec<String>,

    /// Run privileged.
    pub privileged: bool,
}

/// A port entry: a bare number or a `[ip:]host:container` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortEntry {
    Number(i64),
    Text(String),
}

impl ContainerEntry {
    /// Decodes this entry into a spec named `name`.
    pub fn to_spec(&self, name: &str) -> Result<ContainerSpec, JunbanError> {
        let spec = match self {
            ContainerEntry::ImageOnly(image) => ContainerSpec::new(name, image.clone()),
            ContainerEntry::FullSpec(def) => def.to_spec(name)?,
        };

        if spec.image.is_empty() {
            return Err(JunbanError::config(format!(
                "Container {} has no image",
                name
            )));
        }

        Ok(spec)
    }
}

impl ContainerDefinition {
    fn to_spec(&self, name: &str) -> Result<ContainerSpec, JunbanError> {
        let key_error = |key: &str, reason: String| {
            JunbanError::config(format!(
                "Error parsing key '{}' for container {}: {}",
                key, name, reason
            ))
        };

        let dependencies = self
            .dependencies
            .iter()
            .enumerate()
            .map(|(i, d)| parse_dependency(i, d))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| key_error("dependencies", e))?;

        let env = self
            .env
            .iter()
            .enumerate()
            .map(|(i, e)| parse_env(i, e))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| key_error("env", e))?;

        let ports = self
            .ports
            .iter()
            .enumerate()
            .map(|(i, p)| match p {
                PortEntry::Number(n) => parse_port_number(i, *n),
                PortEntry::Text(s) => parse_port(i, s),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| key_error("ports", e))?;

        let mounts = self
            .mount
            .iter()
            .enumerate()
            .map(|(i, m)| parse_mount(i, m))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| key_error("mount", e))?;

        Ok(ContainerSpec {
            name: name.to_string(),
            image: self.image.clone(),
            privileged: self.privileged,
            dependencies,
            env,
            ports,
            mounts,
            mount_from: self.mount_from.clone(),
        })
    }
}
