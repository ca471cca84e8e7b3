//! Nodes - placeable locations in a player's graph

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::colony::archetype::{NodeKind, NodeName};
use crate::core::types::{MaterialId, NodeId, UnitId, Vec2};

/// Tolerance for progress comparisons; ten increments of 0.1 must reach 1.0
pub const PROGRESS_EPSILON: f64 = 1e-9;

/// Returns true once accumulated progress counts as complete
pub fn progress_complete(progress: f64) -> bool {
    progress >= 1.0 - PROGRESS_EPSILON
}

/// A node and the collections it owns
///
/// Membership sets are only changed through the ownership protocol on
/// `PlayerState`, which keeps the back-references on units and materials in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: NodeName,
    kind: NodeKind,
    position: Vec2,
    radius: f64,
    build_progress: f64,
    units: BTreeSet<UnitId>,
    input_materials: BTreeSet<MaterialId>,
    output_materials: BTreeSet<MaterialId>,
}

impl Node {
    /// A new unbuilt node; `base_radius` is scaled by the archetype's kind
    pub fn new(id: NodeId, name: NodeName, position: Vec2, base_radius: f64) -> Self {
        let kind = name.kind();
        Self {
            id,
            name,
            kind,
            position,
            radius: base_radius * kind.radius_factor(),
            build_progress: 0.0,
            units: BTreeSet::new(),
            input_materials: BTreeSet::new(),
            output_materials: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> NodeName {
        self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn build_progress(&self) -> f64 {
        self.build_progress
    }

    /// Add build progress, clamped at 1.0
    pub fn build(&mut self, increment: f64) {
        self.build_progress += increment;
        if progress_complete(self.build_progress) {
            self.build_progress = 1.0;
        }
    }

    pub fn build_fully(&mut self) {
        self.build_progress = 1.0;
    }

    pub fn is_built(&self) -> bool {
        self.build_progress >= 1.0
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        self.position.distance(&other.position)
    }

    /// Disk overlap test
    pub fn intersects(&self, other: &Node) -> bool {
        self.distance_to(other) < self.radius + other.radius
    }

    pub fn units(&self) -> &BTreeSet<UnitId> {
        &self.units
    }

    pub fn input_materials(&self) -> &BTreeSet<MaterialId> {
        &self.input_materials
    }

    pub fn output_materials(&self) -> &BTreeSet<MaterialId> {
        &self.output_materials
    }

    pub(crate) fn units_mut(&mut self) -> &mut BTreeSet<UnitId> {
        &mut self.units
    }

    pub(crate) fn input_materials_mut(&mut self) -> &mut BTreeSet<MaterialId> {
        &mut self.input_materials
    }

    pub(crate) fn output_materials_mut(&mut self) -> &mut BTreeSet<MaterialId> {
        &mut self.output_materials
    }
}
