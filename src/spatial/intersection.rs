//! Placement collision queries

use geo::{coord, EuclideanDistance, Line, Point};

use crate::colony::node::Node;
use crate::spatial::graph::Graph;

/// True if `candidate` overlaps any node disk of `graph`, or its center lies
/// closer than its own radius to any edge segment
pub fn intersects_any(graph: &Graph, candidate: &Node) -> bool {
    if graph.nodes().any(|existing| existing.intersects(candidate)) {
        return true;
    }

    graph.edges().into_iter().any(|(a, b)| {
        match (graph.node(a), graph.node(b)) {
            (Some(a), Some(b)) => segment_clearance(a, b, candidate) < candidate.radius(),
            _ => false,
        }
    })
}

/// Distance from the candidate's center to the closest point of segment `a`-`b`
fn segment_clearance(a: &Node, b: &Node, candidate: &Node) -> f64 {
    let (pa, pb, p) = (a.position(), b.position(), candidate.position());
    let segment = Line::new(coord! { x: pa.x, y: pa.y }, coord! { x: pb.x, y: pb.y });
    Point::new(p.x, p.y).euclidean_distance(&segment)
}
