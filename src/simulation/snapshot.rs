//! Read-only projection of one player's state for clients and tooling

use serde::{Deserialize, Serialize};

use crate::colony::material::Material;
use crate::colony::node::Node;
use crate::core::error::Result;
use crate::core::types::{NodeId, PlayerId, Tick};
use crate::entity::unit::Unit;
use crate::simulation::player::PlayerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player: PlayerId,
    pub tick: Tick,
    pub nodes: Vec<Node>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub units: Vec<Unit>,
    pub materials: Vec<Material>,
}

impl PlayerSnapshot {
    pub fn capture(state: &PlayerState, tick: Tick) -> Self {
        Self {
            player: state.id(),
            tick,
            nodes: state.graph().nodes().cloned().collect(),
            edges: state.graph().edges(),
            units: state.units().cloned().collect(),
            materials: state.materials().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn built_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_built()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::material::{MaterialSlot, MaterialType};
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec2;
    use crate::entity::unit::UnitRole;

    #[test]
    fn test_capture_and_serialize() {
        let mut state =
            PlayerState::new(PlayerId(3), Vec2::new(1.0, 2.0), &SimulationConfig::default()).unwrap();
        let root = state.root().unwrap().id();
        state.spawn_unit(root, UnitRole::Builder).unwrap();
        state
            .spawn_material(MaterialType::Amber, MaterialSlot::Output(root))
            .unwrap();

        let snapshot = PlayerSnapshot::capture(&state, 42);
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.units.len(), 1);
        assert_eq!(snapshot.materials.len(), 1);
        assert_eq!(snapshot.built_nodes(), 1);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["player"], 3);
        assert_eq!(value["tick"], 42);
        assert_eq!(value["units"][0]["role"], "Builder");

        let restored: PlayerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
