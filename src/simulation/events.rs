//! Lifecycle events and the log callers drain after each tick

use serde::{Deserialize, Serialize};

use crate::colony::material::MaterialType;
use crate::core::types::{MaterialId, NodeId, PlayerId, Tick, UnitId};
use crate::entity::actions::ActionKind;

/// A recorded event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub tick: Tick,
    pub player: PlayerId,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// First execution of an action; Moving carries its travel time
    ActionStarted { unit: UnitId, action: ActionKind },
    NodeBuilt { node: NodeId },
    MaterialCreated { material: MaterialId, kind: MaterialType, node: NodeId },
    MaterialConsumed { material: MaterialId, kind: MaterialType, node: NodeId },
    UnitCreated { unit: UnitId, node: NodeId },
}

/// Events accumulated since the last drain
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
    next_event_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick, player: PlayerId, kind: EventKind) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(Event {
            id,
            tick,
            player,
            kind,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn events_for_player(&self, player: PlayerId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.player == player)
    }

    /// Hand over pending events; ids keep counting across drains
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
