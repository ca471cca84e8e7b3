//! Colony Sim - tick-driven settlement economy
//!
//! Each player grows a graph of nodes. Units living on that graph gather,
//! produce, haul and build on their own, following recipes, one increment per
//! tick.

pub mod colony;
pub mod core;
pub mod entity;
pub mod simulation;
pub mod spatial;

pub use crate::colony::{MaterialSlot, MaterialType, NodeKind, NodeName, RecipeCatalog};
pub use crate::core::{
    InvariantViolation, MaterialId, NodeId, PlayerId, Result, SimError, SimulationConfig, UnitId,
    Vec2,
};
pub use crate::entity::{ActionKind, UnitRole};
pub use crate::simulation::{Event, EventKind, PlayerSnapshot, PlayerState, Simulation};
