//! Unit actions and the per-unit action queue

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{MaterialId, NodeId};

/// What an action does, with its in-progress state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Travel along one edge
    Moving {
        from: NodeId,
        to: NodeId,
        speed: f64,
        progress: f64,
        /// Travel duration for client interpolation
        time_ms: f64,
    },
    /// One production cycle consuming the reserved inputs
    Production { inputs: Vec<MaterialId>, progress: f64 },
    /// Build the node the unit stands on
    Building,
    /// Pick up a reserved output material at the current node
    TakeMaterial { material: MaterialId },
    /// Stage the carried material as an input at `destination`
    DropMaterial { destination: NodeId },
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Moving { .. } => "moving",
            ActionKind::Production { .. } => "production",
            ActionKind::Building => "building",
            ActionKind::TakeMaterial { .. } => "take_material",
            ActionKind::DropMaterial { .. } => "drop_material",
        }
    }
}

/// An action plus its lifecycle flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Set on first execution; the started event fires once
    pub started: bool,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            started: false,
        }
    }

    pub fn moving(from: NodeId, to: NodeId, speed: f64, time_ms: f64) -> Self {
        Self::new(ActionKind::Moving {
            from,
            to,
            speed,
            progress: 0.0,
            time_ms,
        })
    }

    pub fn production(inputs: Vec<MaterialId>) -> Self {
        Self::new(ActionKind::Production {
            inputs,
            progress: 0.0,
        })
    }

    pub fn building() -> Self {
        Self::new(ActionKind::Building)
    }

    pub fn take_material(material: MaterialId) -> Self {
        Self::new(ActionKind::TakeMaterial { material })
    }

    pub fn drop_material(destination: NodeId) -> Self {
        Self::new(ActionKind::DropMaterial { destination })
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.kind, ActionKind::Moving { .. })
    }
}

/// Ordered actions of one unit; the front one is executing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionQueue {
    actions: VecDeque<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn front(&self) -> Option<&Action> {
        self.actions.front()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.actions.extend(actions);
    }

    pub(crate) fn pop_front(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Put an unfinished action back at the head
    pub(crate) fn push_front(&mut self, action: Action) {
        self.actions.push_front(action);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Drop everything except a started Moving action at the head
    ///
    /// Returns the removed actions in queue order.
    pub fn clear_keeping_move(&mut self) -> Vec<Action> {
        let keep = self
            .actions
            .front()
            .is_some_and(|action| action.is_moving() && action.started);
        let skip = usize::from(keep);
        self.actions.drain(skip..).collect()
    }
}
