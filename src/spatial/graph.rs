//! Per-player settlement graph
//!
//! Nodes are stored in a `BTreeMap` so every projection iterates in id order.
//! Edges are undirected and weighted by the Euclidean distance between node
//! centers. Nodes and edges are never removed.

use std::collections::{BTreeMap, BTreeSet};

use crate::colony::archetype::NodeKind;
use crate::colony::node::Node;
use crate::core::error::{Result, SimError};
use crate::core::types::NodeId;
use crate::spatial::{intersection, pathfinding};

#[derive(Debug, Clone)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    /// A graph holding only its root node
    pub fn new(root: Node) -> Self {
        let id = root.id();
        let mut nodes = BTreeMap::new();
        nodes.insert(id, root);
        let mut adjacency = BTreeMap::new();
        adjacency.insert(id, BTreeSet::new());
        Self { nodes, adjacency }
    }

    /// Insert `node` and connect it to `existing`
    pub fn add_node_from(&mut self, existing: NodeId, node: Node) -> Result<NodeId> {
        if !self.nodes.contains_key(&existing) {
            return Err(SimError::NodeNotFound(existing));
        }
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(SimError::DuplicateId(id));
        }

        self.nodes.insert(id, node);
        self.adjacency.entry(id).or_default().insert(existing);
        self.adjacency.entry(existing).or_default().insert(id);
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes, ascending by id
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_by_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.kind() == kind)
    }

    pub fn unbuilt_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| !n.is_built())
    }

    pub fn adjacency_of(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.adjacency.get(&id)
    }

    /// Every undirected edge once, as `(lower id, higher id)`
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.adjacency
            .iter()
            .flat_map(|(a, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |b| a < *b)
                    .map(move |b| (*a, *b))
            })
            .collect()
    }

    /// Euclidean length of the edge between `a` and `b`, if they are adjacent
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        if !self.adjacency.get(&a)?.contains(&b) {
            return None;
        }
        Some(self.nodes.get(&a)?.distance_to(self.nodes.get(&b)?))
    }

    /// Cheapest route from `source` to `target`, both inclusive
    pub fn shortest_path(&self, source: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
        pathfinding::shortest_path(self, source, target)
    }

    /// Whether `candidate` would overlap any node disk or edge of this graph
    pub fn intersects_any(&self, candidate: &Node) -> bool {
        intersection::intersects_any(self, candidate)
    }
}
