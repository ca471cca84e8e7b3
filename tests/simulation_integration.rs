//! Integration tests for the settlement simulation
//!
//! These drive the public API end to end:
//! - Construction (staged materials -> builder -> built node)
//! - Hauling (output material -> transporter reservation -> delivery)
//! - Role changes while a unit is travelling
//! - Placement validation across players

mod common;

use colony_sim::entity::ActionKind;
use colony_sim::{
    EventKind, MaterialSlot, MaterialType, NodeName, PlayerId, SimError, UnitRole, Vec2,
};
use common::{assert_consistent, new_sim, root, settlement, P1};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_builder_finishes_node_after_ten_increments() {
    let mut sim = new_sim(1);
    let site = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();

    let state = sim.player_mut(P1).unwrap();
    for kind in [MaterialType::Grass, MaterialType::Grass, MaterialType::Sand] {
        state.spawn_material(kind, MaterialSlot::Input(site)).unwrap();
    }
    let builder = state.spawn_unit(site, UnitRole::Builder).unwrap();

    // Tick 1 queues the Building action, ticks 2..=10 add nine increments
    for _ in 0..10 {
        sim.tick().unwrap();
    }
    let state = sim.player(P1).unwrap();
    assert!(!state.node(site).unwrap().is_built());
    assert_eq!(state.node(site).unwrap().input_materials().len(), 3);

    sim.tick().unwrap();
    let state = sim.player(P1).unwrap();
    let node = state.node(site).unwrap();
    assert!(node.is_built());
    assert!(node.input_materials().is_empty());
    assert_eq!(state.material_count(MaterialType::Grass), 0);
    assert_eq!(state.material_count(MaterialType::Sand), 0);
    assert!(state.unit(builder).unwrap().is_idle());

    let events = sim.drain_events();
    let built: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::NodeBuilt { node } if node == site))
        .collect();
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].tick, 11);
    let consumed = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::MaterialConsumed { .. }))
        .count();
    assert_eq!(consumed, 3);
}

#[test]
fn test_builder_ignores_site_without_materials() {
    let mut sim = new_sim(2);
    let site = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    state
        .spawn_material(MaterialType::Grass, MaterialSlot::Input(site))
        .unwrap();
    state.spawn_unit(root(), UnitRole::Builder).unwrap();

    for _ in 0..30 {
        sim.tick().unwrap();
    }
    let node = sim.player(P1).unwrap().node(site).unwrap();
    assert_eq!(node.build_progress(), 0.0);
}

// ============================================================================
// Hauling
// ============================================================================

#[test]
fn test_transporter_reserves_and_queues_delivery() {
    let mut sim = new_sim(3);
    let site = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    let grass = state
        .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
        .unwrap();
    let carrier = state.spawn_unit(root(), UnitRole::Transporter).unwrap();

    sim.tick().unwrap();

    let state = sim.player(P1).unwrap();
    assert!(state.material(grass).unwrap().is_reserved());
    let queue: Vec<_> = state
        .unit(carrier)
        .unwrap()
        .actions()
        .iter()
        .map(|a| a.kind.clone())
        .collect();
    assert_eq!(queue.len(), 3);
    assert_eq!(queue[0], ActionKind::TakeMaterial { material: grass });
    assert!(matches!(queue[1], ActionKind::Moving { from, to, .. } if from == root() && to == site));
    assert_eq!(queue[2], ActionKind::DropMaterial { destination: site });
}

#[test]
fn test_delivery_stages_input_and_releases_reservation() {
    let mut sim = new_sim(4);
    let site = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    let grass = state
        .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
        .unwrap();
    state.spawn_unit(root(), UnitRole::Transporter).unwrap();

    // 5 / 0.135 = 37.04 ticks on the edge, plus poll, take and drop
    for _ in 0..45 {
        sim.tick().unwrap();
        assert_consistent(sim.player(P1).unwrap());
    }

    let material = sim.player(P1).unwrap().material(grass).unwrap();
    assert_eq!(material.slot(), Some(MaterialSlot::Input(site)));
    assert!(!material.is_reserved());
}

#[test]
fn test_moving_start_event_carries_travel_time() {
    let mut sim = new_sim(5);
    sim.build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    state
        .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
        .unwrap();
    state.spawn_unit(root(), UnitRole::Transporter).unwrap();

    for _ in 0..3 {
        sim.tick().unwrap();
    }
    let time_ms = sim
        .drain_events()
        .into_iter()
        .find_map(|e| match e.kind {
            EventKind::ActionStarted {
                action: ActionKind::Moving { time_ms, .. },
                ..
            } => Some(time_ms),
            _ => None,
        })
        .unwrap();
    // 5 units at 0.135 per tick, 100ms per tick
    assert!((time_ms - 5.0 / 0.135 * 100.0).abs() < 1e-6);
}

// ============================================================================
// Role changes
// ============================================================================

#[test]
fn test_role_change_mid_move_rehomes_material_at_origin() {
    let mut sim = new_sim(6);
    let site = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    let grass = state
        .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
        .unwrap();
    let carrier = state.spawn_unit(root(), UnitRole::Transporter).unwrap();

    // Poll, take, then first step onto the edge
    for _ in 0..3 {
        sim.tick().unwrap();
    }
    {
        let unit = sim.player(P1).unwrap().unit(carrier).unwrap();
        assert_eq!(unit.node(), None);
        assert_eq!(unit.material(), Some(grass));
    }

    let unit = sim.change_unit_type(P1, carrier, UnitRole::Builder).unwrap();
    assert_eq!(unit.role(), UnitRole::Builder);
    assert_eq!(unit.material(), None);
    assert_eq!(unit.actions().len(), 1);
    assert!(matches!(
        unit.actions().front().unwrap().kind,
        ActionKind::Moving { to, .. } if to == site
    ));

    let state = sim.player(P1).unwrap();
    let material = state.material(grass).unwrap();
    assert_eq!(material.slot(), Some(MaterialSlot::Output(root())));
    assert!(!material.is_reserved());
    assert_consistent(state);

    // The preserved move still lands on the far node: 38 increments of 0.027
    for _ in 0..37 {
        sim.tick().unwrap();
    }
    let state = sim.player(P1).unwrap();
    assert_consistent(state);
    assert_eq!(state.unit(carrier).unwrap().node(), Some(site));
}

#[test]
fn test_role_change_releases_planned_pickup() {
    let mut sim = new_sim(7);
    sim.build_node(P1, root(), NodeName::SandTransit, Vec2::new(5.0, 0.0))
        .unwrap();
    let state = sim.player_mut(P1).unwrap();
    let grass = state
        .spawn_material(MaterialType::Grass, MaterialSlot::Output(root()))
        .unwrap();
    let carrier = state.spawn_unit(root(), UnitRole::Transporter).unwrap();

    sim.tick().unwrap();
    assert!(sim.player(P1).unwrap().material(grass).unwrap().is_reserved());

    let unit = sim.change_unit_type(P1, carrier, UnitRole::Idle).unwrap();
    assert!(unit.is_idle());
    assert!(!sim.player(P1).unwrap().material(grass).unwrap().is_reserved());
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_placement_rejections_leave_graph_untouched() {
    let mut sim = new_sim(8);
    sim.add_player(PlayerId(2), Vec2::new(12.0, 0.0)).unwrap();
    let before = sim.snapshot(P1).unwrap();

    // Overlaps our own root
    assert!(matches!(
        sim.build_node(P1, root(), NodeName::SandTransit, Vec2::new(1.0, 0.0)),
        Err(SimError::Intersects(PlayerId(1)))
    ));
    // Overlaps the neighbour's root
    assert!(matches!(
        sim.build_node(P1, root(), NodeName::Well, Vec2::new(10.0, 0.0)),
        Err(SimError::Intersects(PlayerId(2)))
    ));
    assert!(matches!(
        sim.build_node(P1, root(), NodeName::Well, Vec2::new(0.0, 11.0)),
        Err(SimError::TooFar { .. })
    ));

    assert_eq!(sim.snapshot(P1).unwrap(), before);

    // The next accepted node still gets the next id
    let id = sim
        .build_node(P1, root(), NodeName::Well, Vec2::new(-6.0, 0.0))
        .unwrap();
    assert_eq!(id.get(), 2);
}

#[test]
fn test_node_too_close_to_edge_rejected() {
    let mut sim = new_sim(9);
    let far = sim
        .build_node(P1, root(), NodeName::SandTransit, Vec2::new(10.0, 0.0))
        .unwrap();
    // Clear of both disks but straddling the root-far edge
    let err = sim
        .build_node(P1, far, NodeName::SandTransit, Vec2::new(5.0, 0.5))
        .unwrap_err();
    assert!(matches!(err, SimError::Intersects(PlayerId(1))));
}

// ============================================================================
// Whole economy
// ============================================================================

#[test]
fn test_settlement_grows_and_stays_consistent() {
    let mut sim = new_sim(10);
    settlement(&mut sim, P1, Vec2::ZERO, 8);

    let mut progress: Vec<f64> = Vec::new();
    for _ in 0..600 {
        sim.tick().unwrap();
        let state = sim.player(P1).unwrap();
        assert_consistent(state);

        let now: Vec<f64> = state.graph().nodes().map(|n| n.build_progress()).collect();
        for (before, after) in progress.iter().zip(&now) {
            assert!(after >= before, "build progress went backwards");
        }
        progress = now;
    }

    let events = sim.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::MaterialCreated { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::NodeBuilt { .. })));
}

#[test]
fn test_parallel_and_sequential_runs_match() {
    let run = |threshold: usize| {
        let mut config = colony_sim::SimulationConfig::default().with_seed(11);
        config.parallel_threshold = threshold;
        let mut sim =
            colony_sim::Simulation::new(config, colony_sim::RecipeCatalog::with_defaults()).unwrap();
        for p in 0..4u32 {
            settlement(&mut sim, PlayerId(p + 1), Vec2::new(100.0 * p as f64, 0.0), 6);
        }
        for _ in 0..200 {
            sim.tick().unwrap();
        }
        let snapshots: Vec<_> = (1..=4)
            .map(|p| sim.snapshot(PlayerId(p)).unwrap())
            .collect();
        (snapshots, sim.drain_events())
    };

    let (seq_snapshots, seq_events) = run(usize::MAX);
    let (par_snapshots, par_events) = run(1);
    assert_eq!(seq_snapshots, par_snapshots);
    assert_eq!(seq_events, par_events);
}

#[test]
fn test_snapshot_json_lists_everything() {
    let mut sim = new_sim(12);
    settlement(&mut sim, P1, Vec2::ZERO, 4);
    sim.tick().unwrap();

    let json = sim.snapshot(P1).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(value["edges"].as_array().unwrap().len(), 4);
    assert_eq!(value["units"].as_array().unwrap().len(), 4);
    assert_eq!(value["materials"].as_array().unwrap().len(), 9);
}
