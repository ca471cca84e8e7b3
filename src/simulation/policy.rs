//! Decision policy - assigns new work to a unit whose queue ran dry
//!
//! Every choice is deterministic given the player's RNG: candidate nodes are
//! visited in ascending id order and ties go to the lower id.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::colony::archetype::NodeKind;
use crate::colony::material::MaterialType;
use crate::colony::recipe::{first_shortfall, RecipeCatalog};
use crate::core::config::SimulationConfig;
use crate::core::error::InvariantViolation;
use crate::core::types::{MaterialId, NodeId, UnitId};
use crate::entity::actions::{Action, ActionKind};
use crate::entity::unit::UnitRole;
use crate::simulation::player::PlayerState;
use crate::spatial::graph::Graph;
use crate::spatial::pathfinding::path_length;

type Outcome<T = ()> = Result<T, InvariantViolation>;

/// Queue new actions for an idle unit
///
/// Leaves the queue empty when there is nothing to do and nowhere to wander.
pub(crate) fn poll(
    state: &mut PlayerState,
    unit: UnitId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
) -> Outcome {
    let worker = state.unit_ref(unit)?;
    if !worker.is_idle() {
        return Err(InvariantViolation::QueueNotEmpty(unit));
    }
    let role = worker.role();
    let at = state.unit_location(unit)?;

    let planned = match role {
        UnitRole::Idle => None,
        UnitRole::Producer => plan_producer(state, at, recipes, config)?,
        UnitRole::Builder => plan_builder(state, at, recipes, config)?,
        UnitRole::Transporter => plan_transporter(state, unit, at, recipes, config)?,
    };

    let actions = match planned {
        Some(actions) => actions,
        None => wander(state, at, config)?,
    };

    if !actions.is_empty() {
        debug!(
            player = %state.id,
            unit = %unit,
            role = %role,
            first = actions[0].kind.label(),
            count = actions.len(),
            "queued actions"
        );
    }
    state.unit_mut(unit)?.actions_mut().extend(actions);
    Ok(())
}

/// Step to a random built neighbor, or nothing if there is none
fn wander(state: &mut PlayerState, at: NodeId, config: &SimulationConfig) -> Outcome<Vec<Action>> {
    let neighbors: Vec<NodeId> = state
        .graph
        .adjacency_of(at)
        .ok_or(InvariantViolation::MissingNode(at))?
        .iter()
        .copied()
        .filter(|n| state.graph.node(*n).is_some_and(|node| node.is_built()))
        .collect();

    match neighbors.choose(&mut state.rng) {
        Some(&to) => Ok(vec![move_action(&state.graph, at, to, config)?]),
        None => Ok(Vec::new()),
    }
}

fn move_action(graph: &Graph, from: NodeId, to: NodeId, config: &SimulationConfig) -> Outcome<Action> {
    let distance = graph
        .edge_weight(from, to)
        .ok_or(InvariantViolation::Unreachable { from, to })?;
    let time_ms = config.travel_time_ms(distance, config.unit_speed);
    Ok(Action::moving(from, to, config.unit_speed, time_ms))
}

/// One Moving action per hop of the shortest path
fn route(graph: &Graph, from: NodeId, to: NodeId, config: &SimulationConfig) -> Outcome<Vec<Action>> {
    let path = graph
        .shortest_path(from, to)
        .ok_or(InvariantViolation::Unreachable { from, to })?;
    path.windows(2)
        .map(|hop| move_action(graph, hop[0], hop[1], config))
        .collect()
}

/// Candidate with the shortest path from `from`; `candidates` must be ascending
fn nearest(graph: &Graph, from: NodeId, candidates: &[NodeId]) -> Outcome<Option<NodeId>> {
    let mut best: Option<(NodeId, f64)> = None;
    for &candidate in candidates {
        let path = graph
            .shortest_path(from, candidate)
            .ok_or(InvariantViolation::Unreachable { from, to: candidate })?;
        let length = path_length(graph, &path);
        if best.map_or(true, |(_, shortest)| length < shortest) {
            best = Some((candidate, length));
        }
    }
    Ok(best.map(|(node, _)| node))
}

/// Unreserved staged inputs at `node`, counted by type
pub(crate) fn unreserved_input_counts(state: &PlayerState, node: NodeId) -> AHashMap<MaterialType, u32> {
    let mut counts = AHashMap::new();
    let Some(node) = state.graph.node(node) else {
        return counts;
    };
    for material in node.input_materials() {
        if let Some(m) = state.materials.get(material) {
            if !m.is_reserved() {
                *counts.entry(m.kind()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Lowest-id unreserved staged inputs covering `requirements`, or None if short
pub(crate) fn select_unreserved_inputs(
    state: &PlayerState,
    node: NodeId,
    requirements: &[(MaterialType, u32)],
) -> Option<Vec<MaterialId>> {
    let node = state.graph.node(node)?;
    let mut picked = Vec::new();
    for &(kind, count) in requirements {
        let found: Vec<MaterialId> = node
            .input_materials()
            .iter()
            .copied()
            .filter(|id| {
                state
                    .materials
                    .get(id)
                    .is_some_and(|m| m.kind() == kind && !m.is_reserved())
            })
            .take(count as usize)
            .collect();
        if found.len() < count as usize {
            return None;
        }
        picked.extend(found);
    }
    Some(picked)
}

fn plan_producer(
    state: &mut PlayerState,
    at: NodeId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
) -> Outcome<Option<Vec<Action>>> {
    let workplaces: Vec<NodeId> = state
        .graph
        .nodes_by_kind(NodeKind::Production)
        .filter(|n| n.is_built() && recipes.production(n.name()).is_some())
        .map(|n| n.id())
        .collect();
    if workplaces.is_empty() {
        return Ok(None);
    }

    if workplaces.contains(&at) {
        let name = state
            .graph
            .node(at)
            .ok_or(InvariantViolation::MissingNode(at))?
            .name();
        let Some(recipe) = recipes.production(name) else {
            return Ok(Some(Vec::new()));
        };
        return match select_unreserved_inputs(state, at, &recipe.inputs) {
            Some(inputs) => {
                for &input in &inputs {
                    state.reserve(input)?;
                }
                Ok(Some(vec![Action::production(inputs)]))
            }
            // Wait on the node for deliveries
            None => Ok(Some(Vec::new())),
        };
    }

    let mut target: Option<(NodeId, usize)> = None;
    for &candidate in &workplaces {
        let producers = state
            .graph
            .node(candidate)
            .map(|n| {
                n.units()
                    .iter()
                    .filter(|u| {
                        state
                            .units
                            .get(*u)
                            .is_some_and(|u| u.role() == UnitRole::Producer)
                    })
                    .count()
            })
            .unwrap_or(0);
        if target.map_or(true, |(_, fewest)| producers < fewest) {
            target = Some((candidate, producers));
        }
    }

    match target {
        Some((node, _)) => Ok(Some(route(&state.graph, at, node, config)?)),
        None => Ok(None),
    }
}

fn plan_builder(
    state: &mut PlayerState,
    at: NodeId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
) -> Outcome<Option<Vec<Action>>> {
    let view: &PlayerState = state;
    let sites: Vec<NodeId> = view
        .graph
        .unbuilt_nodes()
        .filter(|n| {
            let available = unreserved_input_counts(view, n.id());
            first_shortfall(recipes.building_materials(n.name()), &available).is_none()
        })
        .map(|n| n.id())
        .collect();

    let Some(site) = nearest(&state.graph, at, &sites)? else {
        return Ok(None);
    };
    let mut actions = route(&state.graph, at, site, config)?;
    actions.push(Action::building());
    Ok(Some(actions))
}

/// Deliveries already queued, keyed by destination and material type
fn in_flight_deliveries(state: &PlayerState) -> AHashMap<(NodeId, MaterialType), u32> {
    let mut in_flight = AHashMap::new();
    for unit in state.units.values() {
        let mut pending = unit.material();
        for action in unit.actions().iter() {
            match action.kind {
                ActionKind::TakeMaterial { material } => pending = Some(material),
                ActionKind::DropMaterial { destination } => {
                    if let Some(kind) = pending
                        .take()
                        .and_then(|m| state.materials.get(&m))
                        .map(|m| m.kind())
                    {
                        *in_flight.entry((destination, kind)).or_insert(0) += 1;
                    }
                }
                _ => {}
            }
        }
    }
    in_flight
}

/// Nodes still short of a material, in ascending node order
///
/// Unbuilt nodes ask for their building recipe, built production nodes for
/// one cycle of inputs. Unreserved staged inputs and queued deliveries count
/// toward the need.
fn material_demand(state: &PlayerState, recipes: &RecipeCatalog) -> Vec<(NodeId, MaterialType)> {
    let in_flight = in_flight_deliveries(state);
    let mut demand = Vec::new();

    for node in state.graph.nodes() {
        let requirements: &[(MaterialType, u32)] = if !node.is_built() {
            recipes.building_materials(node.name())
        } else if node.kind() == NodeKind::Production {
            recipes
                .production(node.name())
                .map(|r| r.inputs.as_slice())
                .unwrap_or(&[])
        } else {
            &[]
        };
        if requirements.is_empty() {
            continue;
        }

        let available = unreserved_input_counts(state, node.id());
        for &(kind, needed) in requirements {
            let staged = available.get(&kind).copied().unwrap_or(0);
            let incoming = in_flight.get(&(node.id(), kind)).copied().unwrap_or(0);
            if staged + incoming < needed {
                demand.push((node.id(), kind));
            }
        }
    }
    demand
}

fn plan_transporter(
    state: &mut PlayerState,
    unit: UnitId,
    at: NodeId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
) -> Outcome<Option<Vec<Action>>> {
    let demand = material_demand(state, recipes);
    let destination_for =
        |kind: MaterialType| demand.iter().find(|(_, k)| *k == kind).map(|(node, _)| *node);

    // Still holding something: deliver it, or set it down here
    let carrying = state.unit_ref(unit)?.material();
    if let Some(carried) = carrying {
        let material = state
            .materials
            .get(&carried)
            .ok_or(InvariantViolation::MissingMaterial(carried))?;
        let (kind, reserved) = (material.kind(), material.is_reserved());
        if !reserved {
            state.reserve(carried)?;
        }
        let mut actions = Vec::new();
        let destination = match destination_for(kind) {
            Some(node) => {
                actions = route(&state.graph, at, node, config)?;
                node
            }
            None => at,
        };
        actions.push(Action::drop_material(destination));
        return Ok(Some(actions));
    }

    let job = state
        .materials
        .values()
        .filter(|m| m.is_staged_output() && !m.is_reserved())
        .find_map(|m| {
            let source = m.node()?;
            destination_for(m.kind()).map(|destination| (m.id(), source, destination))
        });

    let Some((material, source, destination)) = job else {
        return Ok(None);
    };

    state.reserve(material)?;
    let mut actions = route(&state.graph, at, source, config)?;
    actions.push(Action::take_material(material));
    actions.extend(route(&state.graph, source, destination, config)?);
    actions.push(Action::drop_material(destination));

    debug!(
        player = %state.id,
        unit = %unit,
        material = %material,
        from = %source,
        to = %destination,
        "delivery planned"
    );
    Ok(Some(actions))
}
