//! Dijkstra shortest paths over the settlement graph
//!
//! Edge cost is the Euclidean distance between node centers. The open set
//! orders entries by `(distance, node id)` so equal-cost frontiers resolve
//! toward the lower id and results never depend on hash order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::NodeId;
use crate::spatial::graph::Graph;

/// Find the cheapest path from `source` to `target`
///
/// Returns None if either end is missing or the target is unreachable.
/// The path includes both ends; `source == target` yields a single node.
pub fn shortest_path(graph: &Graph, source: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
    if !graph.contains(source) || !graph.contains(target) {
        return None;
    }
    if source == target {
        return Some(vec![source]);
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<NodeId, NodeId> = AHashMap::new();
    let mut dist: AHashMap<NodeId, f64> = AHashMap::new();

    dist.insert(source, 0.0);
    open_set.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(current_dist), current))) = open_set.pop() {
        if current == target {
            return Some(reconstruct_path(&came_from, current));
        }

        // Stale heap entry
        if current_dist > *dist.get(&current).unwrap_or(&f64::INFINITY) {
            continue;
        }

        let Some(neighbors) = graph.adjacency_of(current) else {
            continue;
        };

        for &neighbor in neighbors {
            let Some(weight) = graph.edge_weight(current, neighbor) else {
                continue;
            };

            let tentative = current_dist + weight;
            if tentative < *dist.get(&neighbor).unwrap_or(&f64::INFINITY) {
                came_from.insert(neighbor, current);
                dist.insert(neighbor, tentative);
                open_set.push(Reverse((OrderedFloat(tentative), neighbor)));
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &AHashMap<NodeId, NodeId>, mut current: NodeId) -> Vec<NodeId> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Sum of Euclidean hop lengths along `path`
///
/// Hops between non-adjacent or missing nodes count as infinite.
pub fn path_length(graph: &Graph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .map(|hop| graph.edge_weight(hop[0], hop[1]).unwrap_or(f64::INFINITY))
        .sum()
}
