use thiserror::Error;

use crate::colony::archetype::NodeKind;
use crate::colony::material::MaterialType;
use crate::colony::recipe::RecipeLoadError;
use crate::core::types::{MaterialId, NodeId, PlayerId, UnitId};
use crate::entity::unit::UnitRole;

/// Caller-triggered failures. The simulation state is untouched when one is returned.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid {kind} id: identifiers start at 1")]
    InvalidId { kind: &'static str },

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player already registered: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node id already in use: {0}")]
    DuplicateId(NodeId),

    #[error("New node is too far: {distance:.2} > {max:.2}")]
    TooFar { distance: f64, max: f64 },

    #[error("New node intersects the graph of player {0}")]
    Intersects(PlayerId),

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Global configuration already set")]
    ConfigAlreadySet,

    #[error("Invalid recipe data: {0}")]
    Recipe(#[from] RecipeLoadError),

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Defects in core logic. None of these can be caused by a caller; each one
/// aborts the tick it happens in.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("unit {0} does not exist")]
    MissingUnit(UnitId),

    #[error("material {0} does not exist")]
    MissingMaterial(MaterialId),

    #[error("material {0} already has an owning node")]
    MaterialAlreadyOwned(MaterialId),

    #[error("material {material} is not staged as {slot} at node {node}")]
    MaterialNotStaged {
        material: MaterialId,
        node: NodeId,
        slot: &'static str,
    },

    #[error("material {0} is already reserved")]
    AlreadyReserved(MaterialId),

    #[error("material {0} is not reserved")]
    NotReserved(MaterialId),

    #[error("material {0} still has an owner and cannot be destroyed")]
    MaterialStillOwned(MaterialId),

    #[error("unit {unit} is {role}, only transporters carry materials")]
    NotTransporter { unit: UnitId, role: UnitRole },

    #[error("unit {0} already carries a material")]
    AlreadyCarrying(UnitId),

    #[error("unit {0} carries no material")]
    NotCarrying(UnitId),

    #[error("unit {0} is not located at any node")]
    UnitNotAtNode(UnitId),

    #[error("unit {unit} is at node {actual}, expected node {expected}")]
    UnitAtWrongNode {
        unit: UnitId,
        expected: NodeId,
        actual: NodeId,
    },

    #[error("unit {0} is already located at a node")]
    UnitAlreadyPlaced(UnitId),

    #[error("unit {0} was polled while its action queue was not empty")]
    QueueNotEmpty(UnitId),

    #[error("node {node} is a {kind} node, expected {expected}")]
    WrongNodeKind {
        node: NodeId,
        kind: NodeKind,
        expected: NodeKind,
    },

    #[error("node {0} is not built")]
    NodeNotBuilt(NodeId),

    #[error("no path from node {from} to node {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("node {node} lacks {missing} x{count} for its recipe")]
    RecipeUnsatisfied {
        node: NodeId,
        missing: MaterialType,
        count: u32,
    },

    #[error("unit {0} is mid-move but its front action is not Moving")]
    TransitWithoutMove(UnitId),

    #[error("{0} identifiers exhausted")]
    IdsExhausted(&'static str),
}
