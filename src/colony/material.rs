//! Materials - typed resource instances with a single owner

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::{MaterialId, NodeId};

/// Resource catalog
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialType {
    Grass,
    Sand,
    Dew,
    Seed,
    Sugar,
    Juice,
    Chitin,
    Egg,
    Pheromone,
    Amber,
}

impl MaterialType {
    pub const ALL: [MaterialType; 10] = [
        MaterialType::Grass,
        MaterialType::Sand,
        MaterialType::Dew,
        MaterialType::Seed,
        MaterialType::Sugar,
        MaterialType::Juice,
        MaterialType::Chitin,
        MaterialType::Egg,
        MaterialType::Pheromone,
        MaterialType::Amber,
    ];

    /// Parse a lowercase material name (as used in recipe files)
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name.to_lowercase().as_str() {
            "grass" => MaterialType::Grass,
            "sand" => MaterialType::Sand,
            "dew" => MaterialType::Dew,
            "seed" => MaterialType::Seed,
            "sugar" => MaterialType::Sugar,
            "juice" => MaterialType::Juice,
            "chitin" => MaterialType::Chitin,
            "egg" => MaterialType::Egg,
            "pheromone" => MaterialType::Pheromone,
            "amber" => MaterialType::Amber,
            _ => return None,
        };
        Some(kind)
    }
}

/// Where a staged material sits on its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialSlot {
    /// Delivered to the node, waiting to be consumed by a recipe
    Input(NodeId),
    /// Produced by the node, waiting for pickup
    Output(NodeId),
}

impl MaterialSlot {
    pub fn node(&self) -> NodeId {
        match self {
            MaterialSlot::Input(node) | MaterialSlot::Output(node) => *node,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, MaterialSlot::Input(_))
    }
}

/// A single material instance
///
/// `slot` is `None` while a unit carries the material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    id: MaterialId,
    kind: MaterialType,
    slot: Option<MaterialSlot>,
    reserved: bool,
}

impl Material {
    /// A fresh material with no owner; callers stage it right away
    pub(crate) fn new(id: MaterialId, kind: MaterialType) -> Self {
        Self {
            id,
            kind,
            slot: None,
            reserved: false,
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn kind(&self) -> MaterialType {
        self.kind
    }

    pub fn slot(&self) -> Option<MaterialSlot> {
        self.slot
    }

    pub fn node(&self) -> Option<NodeId> {
        self.slot.map(|s| s.node())
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    pub fn is_staged_input(&self) -> bool {
        matches!(self.slot, Some(MaterialSlot::Input(_)))
    }

    pub fn is_staged_output(&self) -> bool {
        matches!(self.slot, Some(MaterialSlot::Output(_)))
    }

    pub(crate) fn set_slot(&mut self, slot: Option<MaterialSlot>) {
        self.slot = slot;
    }

    pub(crate) fn set_reserved(&mut self, reserved: bool) {
        self.reserved = reserved;
    }
}
