//! Spatial graph, shortest paths and placement collision

pub mod graph;
pub mod intersection;
pub mod pathfinding;

pub use graph::Graph;
pub use pathfinding::{path_length, shortest_path};
