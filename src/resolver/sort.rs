//! Topological sort implementation using depth-first search (DFS)
//!
//! ## Algorithm
//!
//! Uses DFS with three-color marking to detect cycles and produce ordering:
//!
//! 1. **WHITE** (unvisited): Node hasn't been processed
//! 2. **GRAY** (temporarily visited): Node is in current recursion stack
//! 3. **BLACK** (permanently visited): Node has been fully processed
//!
//! Cycles are detected when we encounter a GRAY node (already in current path).
//!
//! Independent nodes keep the order of `roots`, so callers pass a sorted
//! list of names to get a deterministic result.
//!
//! [`sorted_topological_sort`] is Kahn's algorithm with a sorted ready
//! queue, for orderings where unrelated names must come out by name.

use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Adjacency list: name -> names it depends on
pub type DependencyMap = BTreeMap<String, Vec<String>>;

/// Context for topological sort operations
struct TopoSortContext<'a> {
    /// Dependency map (adjacency list)
    deps: &'a DependencyMap,
    /// Visited nodes (BLACK)
    visited: HashSet<String>,
    /// Temporarily visited nodes (GRAY) - for cycle detection
    temp_visited: HashSet<String>,
    /// Current DFS path, used to report the cycle
    path: Vec<String>,
    /// Result list in dependency order
    result: Vec<String>,
}

/// Perform topological sort
///
/// Returns names in dependency order (dependencies first, dependents last).
/// Names only reachable as dependencies are included as well.
///
/// # Errors
///
/// Returns the names on the cycle (first name repeated at the end) if the
/// graph contains one.
///
/// # Example
///
/// ```text
/// Dependencies:
///   c depends on b
///   b depends on a
///
/// Roots: ["a", "b", "c"]
///
/// Result: [a, b, c]
/// ```
pub fn topological_sort(
    deps: &DependencyMap,
    roots: &[String],
) -> std::result::Result<Vec<String>, Vec<String>> {
    let mut ctx = TopoSortContext {
        deps,
        visited: HashSet::new(),
        temp_visited: HashSet::new(),
        path: Vec::new(),
        result: Vec::new(),
    };

    for name in roots {
        if !ctx.visited.contains(name) {
            topo_dfs(&mut ctx, name)?;
        }
    }

    Ok(ctx.result)
}

/// DFS helper for topological sort with cycle detection
///
/// Post-order adds nodes to result after all dependencies are processed.
fn topo_dfs(ctx: &mut TopoSortContext, name: &str) -> std::result::Result<(), Vec<String>> {
    // Cycle detection: node already in current path
    if ctx.temp_visited.contains(name) {
        let start = ctx.path.iter().position(|n| n == name).unwrap_or(0);
        let mut chain = ctx.path[start..].to_vec();
        chain.push(name.to_string());
        return Err(chain);
    }

    if ctx.visited.contains(name) {
        return Ok(());
    }

    ctx.temp_visited.insert(name.to_string());
    ctx.path.push(name.to_string());

    let deps = ctx.deps;
    if let Some(node_deps) = deps.get(name) {
        for dep_name in node_deps {
            topo_dfs(ctx, dep_name)?;
        }
    }

    ctx.path.pop();
    ctx.temp_visited.remove(name);
    ctx.visited.insert(name.to_string());
    ctx.result.push(name.to_string());

    Ok(())
}

/// Order `names` dependencies first, always taking the smallest ready name
///
/// Dependencies on names outside `names` are ignored.
///
/// # Errors
///
/// Returns the names left unordered if they form a cycle.
pub fn sorted_topological_sort(
    deps: &DependencyMap,
    names: &[String],
) -> std::result::Result<Vec<String>, Vec<String>> {
    let wanted: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for &name in &wanted {
        let mut count = 0;
        for dep in deps.get(name).into_iter().flatten() {
            if let Some(&dep) = wanted.get(dep.as_str()) {
                dependents.entry(dep).or_default().push(name);
                count += 1;
            }
        }
        pending.insert(name, count);
    }

    let mut ready: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut result = Vec::with_capacity(wanted.len());

    while let Some(name) = ready.pop_first() {
        pending.remove(name);
        result.push(name.to_string());
        for &dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if pending.is_empty() {
        Ok(result)
    } else {
        Err(pending.keys().map(|name| (*name).to_string()).collect())
    }
}
