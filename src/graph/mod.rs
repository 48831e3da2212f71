//! Dependency graph engine: edge store, cycle detection, linearization.

pub mod cycle;
pub mod topology;

pub use cycle::{detect_cycle, find_existing_cycle, CyclePath};
pub use topology::{linearize, OrderKey};

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// In-memory dependency graph keyed by task id.
///
/// Edge direction is task -> prerequisite: `deps[t]` holds the ids that must
/// be completed before `t`. Every mutation that could introduce a cycle is
/// checked before it is committed, so a constructed `DepGraph` is always
/// acyclic unless edges were bulk-loaded (see [`DepGraph::ensure_acyclic`]).
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    deps: HashMap<i64, BTreeSet<i64>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with no edges. Idempotent.
    pub fn add_node(&mut self, id: i64) {
        self.deps.entry(id).or_default();
    }

    /// Add the edge `task -> prerequisite`.
    ///
    /// Fails with `SelfDependency` for a self-edge and with `CycleDetected`
    /// when a path from `prerequisite` back to `task` already exists; in both
    /// cases the graph is left untouched. Re-adding a present edge is a no-op.
    pub fn add_edge(&mut self, task: i64, prerequisite: i64) -> Result<()> {
        if task == prerequisite {
            return Err(Error::SelfDependency(task));
        }

        if let Some(cycle) = detect_cycle(task, prerequisite, &self.deps) {
            return Err(Error::CycleDetected(task, prerequisite, cycle.format()));
        }

        self.deps.entry(task).or_default().insert(prerequisite);
        self.deps.entry(prerequisite).or_default();
        Ok(())
    }

    /// Add an edge without the cycle check, for bulk reconstruction from
    /// persisted records. Callers must follow up with [`ensure_acyclic`].
    ///
    /// [`ensure_acyclic`]: DepGraph::ensure_acyclic
    pub(crate) fn add_edge_unchecked(&mut self, task: i64, prerequisite: i64) {
        self.deps.entry(task).or_default().insert(prerequisite);
        self.deps.entry(prerequisite).or_default();
    }

    /// Remove the edge `task -> prerequisite`. Idempotent.
    pub fn remove_edge(&mut self, task: i64, prerequisite: i64) {
        if let Some(prereqs) = self.deps.get_mut(&task) {
            prereqs.remove(&prerequisite);
        }
    }

    /// Remove a node and every edge touching it. Idempotent.
    pub fn remove_node(&mut self, id: i64) {
        self.deps.remove(&id);
        for prereqs in self.deps.values_mut() {
            prereqs.remove(&id);
        }
    }

    /// Prerequisites of one task.
    pub fn dependencies_of(&self, id: i64) -> impl Iterator<Item = i64> + '_ {
        self.deps.get(&id).into_iter().flatten().copied()
    }

    /// Full adjacency map, for cycle detection and linearization.
    pub fn deps(&self) -> &HashMap<i64, BTreeSet<i64>> {
        &self.deps
    }

    /// Verify the whole graph is acyclic, as required after bulk loading.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let nodes: BTreeSet<i64> = self.deps.keys().copied().collect();
        match find_existing_cycle(&nodes, &self.deps) {
            Some(cycle) => Err(Error::CycleDetected(
                cycle.path[0],
                cycle.path[1],
                cycle.format(),
            )),
            None => Ok(()),
        }
    }
}
