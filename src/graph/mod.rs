//! Dependency graph module.
//!
//! Containers are kept in a fixed-order slice and referred to by index. The
//! graph stores, for every index, the indices that depend on it (forward
//! edges) and the indices it depends on, so that neither the sorter nor the
//! orchestrator ever needs to hold references between specs.
//!
//! An edge `a -> b` means that `b` depends on `a`: `a` must be provisioned
//! first. Both `dependencies` and `mount-from` entries produce edges, since a
//! container cannot inherit volumes from a container that does not exist yet.

mod sort;


pub use sort::{sort, OrderedPlan};

use crate::container::ContainerSpec;
use crate::error::{JunbanError, Result};
use std::collections::{HashMap, HashSet};

/// Index-based directed graph over a slice of container specs.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    names: Vec<String>,
    /// `dependents[a]` lists every `b` with an edge `a -> b`.
    dependents: Vec<Vec<usize>>,
    /// `dependencies[b]` lists every `a` with an edge `a -> b`.
    dependencies: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Builds the graph for `specs`.
    ///
    /// Fails on duplicate names, self-dependencies and references to names
    /// that are not part of `specs`.
    pub fn build(specs: &[ContainerSpec]) -> Result<Self> {
        let mut indexes: HashMap<&str, usize> = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if indexes.insert(spec.name.as_str(), i).is_some() {
                return Err(JunbanError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
        }

        let mut dependents = vec![Vec::new(); specs.len()];
        let mut dependencies = vec![Vec::new(); specs.len()];

        for (i, spec) in specs.iter().enumerate() {
            let mut seen = HashSet::new();
            for target in spec.upstream_names() {
                if target == spec.name {
                    return Err(JunbanError::SelfDependency {
                        name: spec.name.clone(),
                    });
                }

                let upstream =
                    *indexes
                        .get(target)
                        .ok_or_else(|| JunbanError::UnknownDependency {
                            source_name: spec.name.clone(),
                            target: target.to_string(),
                        })?;

                // A dependency that is also a mount-from source is one edge.
                if seen.insert(upstream) {
                    dependents[upstream].push(i);
                    dependencies[i].push(upstream);
                }
            }
        }

        Ok(Self {
            names: specs.iter().map(|s| s.name.clone()).collect(),
            dependents,
            dependencies,
        })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(Vec::len).sum()
    }

    /// Name of the container at `index`.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Indices that depend on `index`.
    pub fn dependents(&self, index: usize) -> &[usize] {
        &self.dependents[index]
    }

    /// Indices that `index` depends on.
    pub fn dependencies(&self, index: usize) -> &[usize] {
        &self.dependencies[index]
    }

    /// Initial in-degree of every node: the number of dependencies it has
    /// outstanding before anything is provisioned.
    pub fn in_degrees(&self) -> Vec<usize> {
        self.dependencies.iter().map(Vec::len).collect()
    }
}

/// Builds the graph for `specs` and sorts it.
pub fn plan(specs: &[ContainerSpec]) -> Result<OrderedPlan> {
    let graph = DependencyGraph::build(specs)?;
    sort(&graph)
}
