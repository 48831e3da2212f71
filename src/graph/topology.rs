//! Topological linearization using Kahn's algorithm.

use crate::error::{Error, Result};
use crate::graph::cycle::find_existing_cycle;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

/// Tie-breaking key for the ready heap.
///
/// Among tasks whose prerequisites are all emitted, the next one out is the
/// highest score; ties fall back to older `created_at`, then smaller id, so
/// the ordering is total and deterministic for a fixed input set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: greater keys pop first.
        self.score
            .cmp(&other.score)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Linearize the dependency graph restricted to the keyed task set.
///
/// `keys` carries one entry per task to order; `deps` maps task id to its
/// prerequisite ids (edges pointing outside the keyed set are ignored, which
/// is how completed prerequisites stop constraining their dependents).
///
/// Every prerequisite appears before its dependents. If the restricted graph
/// contains a cycle the whole call fails with `Error::CycleDetected` instead
/// of emitting a truncated sequence.
pub fn linearize(
    keys: &HashMap<i64, OrderKey>,
    deps: &HashMap<i64, BTreeSet<i64>>,
) -> Result<Vec<i64>> {
    let mut in_degree: HashMap<i64, usize> = HashMap::new();
    let mut dependents: HashMap<i64, Vec<i64>> = HashMap::new();

    for (&id, _) in keys.iter() {
        let mut degree = 0;
        for &dep in deps.get(&id).into_iter().flatten() {
            if keys.contains_key(&dep) {
                degree += 1;
                dependents.entry(dep).or_default().push(id);
            }
        }
        in_degree.insert(id, degree);
    }

    let mut heap: BinaryHeap<OrderKey> = BinaryHeap::new();
    for (&id, &degree) in &in_degree {
        if degree == 0 {
            if let Some(&key) = keys.get(&id) {
                heap.push(key);
            }
        }
    }

    let mut result = Vec::with_capacity(keys.len());

    while let Some(key) = heap.pop() {
        result.push(key.id);

        for &dependent in dependents.get(&key.id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    if let Some(&key) = keys.get(&dependent) {
                        heap.push(key);
                    }
                }
            }
        }
    }

    if result.len() == keys.len() {
        return Ok(result);
    }

    // Some tasks were never emitted: the restriction contains a cycle.
    let remaining: BTreeSet<i64> = keys
        .keys()
        .copied()
        .filter(|id| !result.contains(id))
        .collect();
    let restricted: HashMap<i64, BTreeSet<i64>> = remaining
        .iter()
        .map(|&id| {
            let prereqs = deps
                .get(&id)
                .into_iter()
                .flatten()
                .copied()
                .filter(|dep| remaining.contains(dep))
                .collect();
            (id, prereqs)
        })
        .collect();

    match find_existing_cycle(&remaining, &restricted) {
        Some(cycle) => Err(Error::CycleDetected(
            cycle.path[0],
            cycle.path[1],
            cycle.format(),
        )),
        None => {
            let id = remaining.iter().next().copied().unwrap_or_default();
            Err(Error::CycleDetected(id, id, String::from("unresolved")))
        }
    }
}
