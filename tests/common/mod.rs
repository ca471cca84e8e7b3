//! Shared fixtures and consistency checks for integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use colony_sim::entity::ActionKind;
use colony_sim::{
    MaterialId, MaterialSlot, MaterialType, NodeId, NodeName, PlayerId, PlayerState,
    RecipeCatalog, Simulation, SimulationConfig, UnitRole, Vec2,
};

pub const P1: PlayerId = PlayerId(1);

pub fn root() -> NodeId {
    NodeId::new(1).unwrap()
}

pub fn new_sim(seed: u64) -> Simulation {
    let config = SimulationConfig::default().with_seed(seed);
    let mut sim = Simulation::new(config, RecipeCatalog::with_defaults()).unwrap();
    sim.add_player(P1, Vec2::ZERO).unwrap();
    sim
}

/// Root stocked with raw materials, two working producers, two open sites
pub fn settlement(sim: &mut Simulation, player: PlayerId, origin: Vec2, workers: usize) {
    if sim.player(player).is_none() {
        sim.add_player(player, origin).unwrap();
    }
    let at = |x: f64, y: f64| Vec2::new(origin.x + x, origin.y + y);
    let field = sim
        .build_node(player, root(), NodeName::GrassField, at(7.0, 0.0))
        .unwrap();
    let well = sim
        .build_node(player, root(), NodeName::Well, at(-7.0, 0.0))
        .unwrap();
    sim.build_node(player, root(), NodeName::SandTransit, at(0.0, 6.0))
        .unwrap();
    sim.build_node(player, root(), NodeName::SeedStorage, at(0.0, -8.0))
        .unwrap();

    let state = sim.player_mut(player).unwrap();
    state.complete_node(field).unwrap();
    state.complete_node(well).unwrap();
    for _ in 0..6 {
        state
            .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
            .unwrap();
    }
    for _ in 0..3 {
        state
            .spawn_material(MaterialType::Sand, MaterialSlot::Output(root()))
            .unwrap();
    }
    for i in 0..workers {
        state.spawn_unit(root(), UnitRole::ALL[i % 4]).unwrap();
    }
}

/// Panics if any ownership or reservation relationship is out of step
pub fn assert_consistent(state: &PlayerState) {
    // Materials: exactly one owner, mirrored on the owning side
    let mut carried: BTreeMap<MaterialId, usize> = BTreeMap::new();
    for unit in state.units() {
        if let Some(m) = unit.material() {
            assert_eq!(unit.role(), UnitRole::Transporter, "non-transporter carries {m}");
            *carried.entry(m).or_default() += 1;
        }
    }
    for material in state.materials() {
        let id = material.id();
        match material.slot() {
            Some(MaterialSlot::Input(n)) => {
                assert!(state.node(n).unwrap().input_materials().contains(&id));
                assert!(!carried.contains_key(&id), "{id} staged and carried");
            }
            Some(MaterialSlot::Output(n)) => {
                assert!(state.node(n).unwrap().output_materials().contains(&id));
                assert!(!carried.contains_key(&id), "{id} staged and carried");
            }
            None => assert_eq!(carried.get(&id), Some(&1), "{id} has no owner"),
        }
    }
    for node in state.graph().nodes() {
        for m in node.input_materials() {
            assert_eq!(
                state.material(*m).unwrap().slot(),
                Some(MaterialSlot::Input(node.id()))
            );
        }
        for m in node.output_materials() {
            assert_eq!(
                state.material(*m).unwrap().slot(),
                Some(MaterialSlot::Output(node.id()))
            );
        }
        for u in node.units() {
            assert_eq!(state.unit(*u).unwrap().node(), Some(node.id()));
        }
    }

    // Units: placed on the node that lists them, or travelling an edge
    for unit in state.units() {
        match unit.node() {
            Some(n) => assert!(state.node(n).unwrap().units().contains(&unit.id())),
            None => {
                let front = unit.actions().front().expect("unit in transit has no action");
                assert!(
                    matches!(front.kind, ActionKind::Moving { .. }) && front.started,
                    "unit {} in transit without a started move",
                    unit.id()
                );
            }
        }
    }

    // Reservations: each reserved material is claimed by exactly one action or carrier
    let mut claims: BTreeMap<MaterialId, usize> = BTreeMap::new();
    for unit in state.units() {
        if let Some(m) = unit.material() {
            *claims.entry(m).or_default() += 1;
        }
        for action in unit.actions().iter() {
            match &action.kind {
                ActionKind::Production { inputs, .. } => {
                    for m in inputs {
                        *claims.entry(*m).or_default() += 1;
                    }
                }
                ActionKind::TakeMaterial { material } => {
                    *claims.entry(*material).or_default() += 1;
                }
                _ => {}
            }
        }
    }
    let reserved: BTreeSet<MaterialId> = state
        .materials()
        .filter(|m| m.is_reserved())
        .map(|m| m.id())
        .collect();
    let claimed: BTreeSet<MaterialId> = claims.keys().copied().collect();
    assert_eq!(reserved, claimed, "reservations out of step with queued work");
    assert!(claims.values().all(|&c| c == 1), "material claimed twice");
}
