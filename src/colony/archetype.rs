//! Node archetypes - the fixed catalog of things a player can build

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Broad role of a node, derived from its archetype
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Transit,
    Production,
    Defense,
}

impl NodeKind {
    /// Collision radius as a multiple of the configured base radius
    pub fn radius_factor(&self) -> f64 {
        match self {
            NodeKind::Transit => 1.0,
            NodeKind::Production => 2.0,
            NodeKind::Defense => 1.0,
        }
    }
}

/// Building archetype of a node
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeName {
    SandTransit,
    GrassField,
    Well,
    SeedStorage,
    AphidDistillation,
    RawMaterialVat,
    ChitinPress,
    EggFarm,
    PheromoneMine,
    Incubator,
    GeneticHatchery,
    GuardOutpost,
    AmberTurret,
}

impl NodeName {
    pub const ALL: [NodeName; 13] = [
        NodeName::SandTransit,
        NodeName::GrassField,
        NodeName::Well,
        NodeName::SeedStorage,
        NodeName::AphidDistillation,
        NodeName::RawMaterialVat,
        NodeName::ChitinPress,
        NodeName::EggFarm,
        NodeName::PheromoneMine,
        NodeName::Incubator,
        NodeName::GeneticHatchery,
        NodeName::GuardOutpost,
        NodeName::AmberTurret,
    ];

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeName::SandTransit => NodeKind::Transit,
            NodeName::GrassField
            | NodeName::Well
            | NodeName::SeedStorage
            | NodeName::AphidDistillation
            | NodeName::RawMaterialVat
            | NodeName::ChitinPress
            | NodeName::EggFarm
            | NodeName::PheromoneMine
            | NodeName::Incubator
            | NodeName::GeneticHatchery => NodeKind::Production,
            NodeName::GuardOutpost | NodeName::AmberTurret => NodeKind::Defense,
        }
    }

    /// Parse a snake_case archetype name (as used in recipe files)
    pub fn parse(name: &str) -> Option<Self> {
        let name = match name.to_lowercase().as_str() {
            "sand_transit" => NodeName::SandTransit,
            "grass_field" => NodeName::GrassField,
            "well" => NodeName::Well,
            "seed_storage" => NodeName::SeedStorage,
            "aphid_distillation" => NodeName::AphidDistillation,
            "raw_material_vat" => NodeName::RawMaterialVat,
            "chitin_press" => NodeName::ChitinPress,
            "egg_farm" => NodeName::EggFarm,
            "pheromone_mine" => NodeName::PheromoneMine,
            "incubator" => NodeName::Incubator,
            "genetic_hatchery" => NodeName::GeneticHatchery,
            "guard_outpost" => NodeName::GuardOutpost,
            "amber_turret" => NodeName::AmberTurret,
            _ => return None,
        };
        Some(name)
    }
}
