//! Cycle detection in the dependency graph.

use std::collections::{BTreeSet, HashMap, HashSet};

/// A path representing a cycle in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath {
    pub path: Vec<i64>,
}

impl CyclePath {
    pub fn new(path: Vec<i64>) -> Self {
        Self { path }
    }

    /// Format the cycle as a string, e.g. `#1 -> #2 -> #1`.
    pub fn format(&self) -> String {
        self.path
            .iter()
            .map(|id| format!("#{id}"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Detect whether adding the edge `task -> prerequisite` would create a cycle.
///
/// `deps` maps task id -> set of prerequisite ids (edge direction
/// task -> prerequisite). The new edge closes a cycle exactly when a path
/// `prerequisite -> ... -> task` already exists; the returned path lists the
/// full cycle starting and ending at `prerequisite`.
pub fn detect_cycle(
    task: i64,
    prerequisite: i64,
    deps: &HashMap<i64, BTreeSet<i64>>,
) -> Option<CyclePath> {
    let mut visited = HashSet::new();

    find_path(prerequisite, task, deps, &mut visited).map(|mut path| {
        // Close the cycle: prerequisite -> ... -> task -> prerequisite.
        path.push(prerequisite);
        CyclePath::new(path)
    })
}

/// Find any cycle already present in `deps`, restricted to the given nodes.
///
/// Used at load time to reject corrupted persisted state instead of silently
/// truncating the graph.
pub fn find_existing_cycle(
    nodes: &BTreeSet<i64>,
    deps: &HashMap<i64, BTreeSet<i64>>,
) -> Option<CyclePath> {
    // A node participates in a cycle iff it can reach itself.
    for &start in nodes {
        for &dep in deps.get(&start).into_iter().flatten() {
            let mut visited = HashSet::new();
            if let Some(mut path) = find_path(dep, start, deps, &mut visited) {
                path.insert(0, start);
                return Some(CyclePath::new(path));
            }
        }
    }
    None
}

/// Depth-first search for a path from `start` to `target` along dependency
/// edges.
///
/// Returns the path `[start, ..., target]` if one exists.
fn find_path(
    start: i64,
    target: i64,
    deps: &HashMap<i64, BTreeSet<i64>>,
    visited: &mut HashSet<i64>,
) -> Option<Vec<i64>> {
    if start == target {
        return Some(vec![start]);
    }

    visited.insert(start);

    for &next in deps.get(&start).into_iter().flatten() {
        if visited.contains(&next) {
            continue;
        }
        if let Some(mut path) = find_path(next, target, deps, visited) {
            path.insert(0, start);
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps_from(edges: &[(i64, i64)]) -> HashMap<i64, BTreeSet<i64>> {
        let mut deps: HashMap<i64, BTreeSet<i64>> = HashMap::new();
        for &(task, prerequisite) in edges {
            deps.entry(task).or_default().insert(prerequisite);
        }
        deps
    }

    #[test]
    fn test_no_cycle_on_empty_graph() {
        let deps = HashMap::new();
        assert!(detect_cycle(1, 2, &deps).is_none());
    }

    #[test]
    fn test_direct_cycle_detected() {
        // 2 depends on 1; adding 1 -> 2 closes the cycle.
        let deps = deps_from(&[(2, 1)]);
        let cycle = detect_cycle(1, 2, &deps).unwrap();
        assert_eq!(cycle.path, vec![2, 1, 2]);
    }

    #[test]
    fn test_transitive_cycle_detected() {
        // 3 -> 2 -> 1; adding 1 -> 3 closes 3 -> 2 -> 1 -> 3.
        let deps = deps_from(&[(2, 1), (3, 2)]);
        let cycle = detect_cycle(1, 3, &deps).unwrap();
        assert_eq!(cycle.path, vec![3, 2, 1, 3]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // 4 -> {2, 3}, 2 -> 1, 3 -> 1: shared prerequisite, still a DAG.
        let deps = deps_from(&[(4, 2), (4, 3), (2, 1), (3, 1)]);
        assert!(detect_cycle(1, 5, &deps).is_none());
        assert!(find_existing_cycle(&BTreeSet::from([1, 2, 3, 4]), &deps).is_none());
    }

    #[test]
    fn test_find_existing_cycle() {
        let deps = deps_from(&[(1, 2), (2, 3), (3, 1)]);
        let nodes = BTreeSet::from([1, 2, 3]);
        let cycle = find_existing_cycle(&nodes, &deps).unwrap();
        // Starts and ends at the same node.
        assert_eq!(cycle.path.first(), cycle.path.last());
        assert!(cycle.path.len() >= 4);
    }

    #[test]
    fn test_cycle_format() {
        let cycle = CyclePath::new(vec![2, 1, 2]);
        assert_eq!(cycle.format(), "#2 -> #1 -> #2");
    }
}
