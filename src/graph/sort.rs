//! Topological sort (Kahn's algorithm) with cycle reporting.

use super::DependencyGraph;
use crate::error::{JunbanError, Result};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// A creation order over spec indices.
///
/// For every edge `a -> b`, `a` appears before `b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderedPlan {
    order: Vec<usize>,
}

impl OrderedPlan {
    /// Spec indices in provisioning order.
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    /// Iterates over spec indices in provisioning order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of `index` in the plan.
    pub fn position(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }
}

/// Sorts `graph` into an [`OrderedPlan`].
///
/// Nodes become ready in the order their last dependency is resolved; nodes
/// that are ready from the start are taken in index order. The result is
/// therefore a pure function of the graph.
///
/// Fails with [`JunbanError::Cycle`] if any node can never become ready.
pub fn sort(graph: &DependencyGraph) -> Result<OrderedPlan> {
    let mut in_degree = graph.in_degrees();
    let mut ready: VecDeque<usize> = (0..graph.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_front() {
        order.push(node);
        for &dependent in graph.dependents(node) {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if order.len() == graph.len() {
        debug!(nodes = graph.len(), edges = graph.edge_count(), "Sorted dependency graph");
        return Ok(OrderedPlan { order });
    }

    let participants = cycle_participants(graph, &in_degree)
        .into_iter()
        .map(|i| graph.name(i).to_string())
        .collect();

    Err(JunbanError::Cycle { participants })
}

/// Narrows the unresolved nodes left by Kahn's pass down to those on a cycle.
///
/// Unresolved nodes are the cycles plus everything downstream of them.
/// Peeling, in reverse, every unresolved node that has no unresolved
/// dependent removes the downstream tails and leaves the cycles (and any
/// path joining two cycles). Indices are returned in ascending order.
fn cycle_participants(graph: &DependencyGraph, in_degree: &[usize]) -> Vec<usize> {
    let unresolved: Vec<bool> = in_degree.iter().map(|&d| d > 0).collect();

    let mut out_degree: Vec<usize> = (0..graph.len())
        .map(|i| {
            if unresolved[i] {
                graph.dependents(i).iter().filter(|&&d| unresolved[d]).count()
            } else {
                0
            }
        })
        .collect();

    let mut peeled = vec![false; graph.len()];
    let mut tails: Vec<usize> = (0..graph.len())
        .filter(|&i| unresolved[i] && out_degree[i] == 0)
        .collect();

    while let Some(node) = tails.pop() {
        peeled[node] = true;
        for &upstream in graph.dependencies(node) {
            if unresolved[upstream] && !peeled[upstream] {
                out_degree[upstream] -= 1;
                if out_degree[upstream] == 0 {
                    tails.push(upstream);
                }
            }
        }
    }

    (0..graph.len())
        .filter(|&i| unresolved[i] && !peeled[i])
        .collect()
}
