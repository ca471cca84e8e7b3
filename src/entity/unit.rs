//! Units - autonomous workers living on a player's graph

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::{MaterialId, NodeId, UnitId};
use crate::entity::actions::ActionQueue;

/// Work a unit chooses when its queue runs dry
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitRole {
    #[default]
    Idle,
    Producer,
    Builder,
    Transporter,
}

impl UnitRole {
    pub const ALL: [UnitRole; 4] = [
        UnitRole::Idle,
        UnitRole::Producer,
        UnitRole::Builder,
        UnitRole::Transporter,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    role: UnitRole,
    /// `None` while travelling an edge
    node: Option<NodeId>,
    /// Only transporters ever carry
    material: Option<MaterialId>,
    actions: ActionQueue,
}

impl Unit {
    pub(crate) fn new(id: UnitId, role: UnitRole) -> Self {
        Self {
            id,
            role,
            node: None,
            material: None,
            actions: ActionQueue::new(),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn role(&self) -> UnitRole {
        self.role
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    pub fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    pub fn is_idle(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn actions_mut(&mut self) -> &mut ActionQueue {
        &mut self.actions
    }

    pub(crate) fn set_role(&mut self, role: UnitRole) {
        self.role = role;
    }

    pub(crate) fn set_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    pub(crate) fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
    }
}
