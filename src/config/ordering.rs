// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stage ordering for valve chains.
//!
//! Stages are declared in a list, and may additionally name stages they must
//! run `after` or `before`. This module turns those constraints into the
//! final chain order.
//!
//! # Algorithms
//!
//! ## Ordering
//! Uses **Kahn's algorithm** with a min-heap of ready stage indices:
//! - Among stages whose constraints are satisfied, the one declared first runs first
//! - Without constraints the declared order is preserved exactly
//! - **Time Complexity**: O((V + E) log V)
//!
//! ## Cycle Detection
//! Uses **DFS with a recursion stack**, so the reported error carries the
//! actual cycle path (`a -> b -> a`) instead of a bare "cycle found".
//!
//! References to stage names that do not exist are ignored here; reporting
//! them is the job of [`validate_config`](crate::config::validate_config).
//! A reference to a name shared by several stages constrains all of them.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::StageConfig;

/// Forward adjacency by stage index: `edges[i]` holds the stages that must run after `i`.
fn build_edges(stages: &[StageConfig]) -> Vec<Vec<usize>> {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, stage) in stages.iter().enumerate() {
        by_name.entry(stage.stage_name()).or_default().push(index);
    }

    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); stages.len()];
    for (index, stage) in stages.iter().enumerate() {
        for reference in &stage.after {
            for &earlier in by_name.get(reference.as_str()).into_iter().flatten() {
                edges[earlier].push(index);
            }
        }
        for reference in &stage.before {
            for &later in by_name.get(reference.as_str()).into_iter().flatten() {
                edges[index].push(later);
            }
        }
    }

    for targets in &mut edges {
        targets.sort_unstable();
        targets.dedup();
    }
    edges
}

/// Compute the run order of `stages` as indices into the slice.
///
/// # Returns
///
/// * `Ok(order)` - Every stage index exactly once, constraints honored
/// * `Err(cycle)` - Stage names forming a cycle, first name repeated at the end
///
/// # Example
///
/// ```
/// use valvechain::config::{ordered_stage_indices, StageConfig};
///
/// let stages = vec![
///     StageConfig::valve("render"),
///     StageConfig::valve("diagnostics").before(&["render"]),
///     StageConfig::valve("noop"),
/// ];
///
/// assert_eq!(ordered_stage_indices(&stages).unwrap(), vec![1, 0, 2]);
/// ```
pub fn ordered_stage_indices(stages: &[StageConfig]) -> Result<Vec<usize>, Vec<String>> {
    let edges = build_edges(stages);

    let mut in_degree = vec![0usize; stages.len()];
    for targets in &edges {
        for &target in targets {
            in_degree[target] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(stages.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for &target in &edges[index] {
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.push(Reverse(target));
            }
        }
    }

    if order.len() == stages.len() {
        Ok(order)
    } else {
        Err(find_ordering_cycle(stages).unwrap_or_else(|| {
            // Kahn stalled, so the leftover stages are all on or behind a cycle
            let placed: HashSet<usize> = order.into_iter().collect();
            (0..stages.len())
                .filter(|index| !placed.contains(index))
                .map(|index| stages[index].stage_name().to_string())
                .collect()
        }))
    }
}

/// Find one ordering cycle among `stages`, if any.
///
/// The returned path starts and ends with the same stage name, e.g.
/// `["cache", "render", "cache"]`.
pub fn find_ordering_cycle(stages: &[StageConfig]) -> Option<Vec<String>> {
    let edges = build_edges(stages);
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for start in 0..stages.len() {
        if visited.contains(&start) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(start, &edges, &mut visited, &mut rec_stack, &mut path) {
            return Some(
                cycle
                    .into_iter()
                    .map(|index| stages[index].stage_name().to_string())
                    .collect(),
            );
        }
    }
    None
}

/// DFS with recursion stack; a back edge to a node still on the stack closes a cycle.
fn dfs_cycle_detection(
    node: usize,
    edges: &[Vec<usize>],
    visited: &mut HashSet<usize>,
    rec_stack: &mut HashSet<usize>,
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    for &neighbor in &edges[node] {
        if !visited.contains(&neighbor) {
            if let Some(cycle) = dfs_cycle_detection(neighbor, edges, visited, rec_stack, path) {
                return Some(cycle);
            }
        } else if rec_stack.contains(&neighbor) {
            let cycle_start = path.iter().position(|&x| x == neighbor)?;
            let mut cycle = path[cycle_start..].to_vec();
            cycle.push(neighbor);
            return Some(cycle);
        }
    }

    rec_stack.remove(&node);
    path.pop();
    None
}
