//! Action execution - advances the front action of a busy unit by one tick

use tracing::{info, trace};

use crate::colony::archetype::NodeKind;
use crate::colony::material::MaterialSlot;
use crate::colony::node::progress_complete;
use crate::colony::recipe::{first_shortfall, RecipeCatalog};
use crate::core::config::SimulationConfig;
use crate::core::error::InvariantViolation;
use crate::core::types::{MaterialId, NodeId, UnitId};
use crate::entity::actions::ActionKind;
use crate::entity::unit::UnitRole;
use crate::simulation::events::EventKind;
use crate::simulation::player::PlayerState;
use crate::simulation::policy::{select_unreserved_inputs, unreserved_input_counts};

type Outcome<T = ()> = Result<T, InvariantViolation>;

/// Run one increment of the unit's front action
///
/// A finished action is dropped from the queue; anything else goes back to
/// the head with its updated progress.
pub(crate) fn execute_front(
    state: &mut PlayerState,
    unit: UnitId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
    events: &mut Vec<EventKind>,
) -> Outcome {
    let Some(mut action) = state.unit_mut(unit)?.actions_mut().pop_front() else {
        return Ok(());
    };

    let first_run = !action.started;
    if first_run {
        action.started = true;
        events.push(EventKind::ActionStarted {
            unit,
            action: action.kind.clone(),
        });
    }

    let done = match &mut action.kind {
        ActionKind::Moving {
            from,
            to,
            speed,
            progress,
            ..
        } => advance_move(state, unit, *from, *to, *speed, progress, first_run)?,
        ActionKind::Production { inputs, progress } => {
            advance_production(state, unit, inputs, progress, recipes, config, events)?
        }
        ActionKind::Building => advance_building(state, unit, recipes, config, events)?,
        ActionKind::TakeMaterial { material } => {
            state.pickup(unit, *material)?;
            true
        }
        ActionKind::DropMaterial { destination } => drop_material(state, unit, *destination)?,
    };

    if !done {
        state.unit_mut(unit)?.actions_mut().push_front(action);
    }
    Ok(())
}

fn advance_move(
    state: &mut PlayerState,
    unit: UnitId,
    from: NodeId,
    to: NodeId,
    speed: f64,
    progress: &mut f64,
    first_run: bool,
) -> Outcome<bool> {
    if first_run {
        state.detach_unit(unit, from)?;
    }

    let origin = state
        .graph
        .node(from)
        .ok_or(InvariantViolation::MissingNode(from))?;
    let destination = state
        .graph
        .node(to)
        .ok_or(InvariantViolation::MissingNode(to))?;
    let distance = origin.distance_to(destination);

    if distance > 0.0 {
        *progress += speed / distance;
    } else {
        *progress = 1.0;
    }
    trace!(unit = %unit, from = %from, to = %to, progress = *progress, "moving");

    if progress_complete(*progress) {
        *progress = 1.0;
        state.place_unit(unit, to)?;
        return Ok(true);
    }
    Ok(false)
}

fn advance_production(
    state: &mut PlayerState,
    unit: UnitId,
    inputs: &[MaterialId],
    progress: &mut f64,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
    events: &mut Vec<EventKind>,
) -> Outcome<bool> {
    let at = state.unit_location(unit)?;
    let node = state
        .graph
        .node(at)
        .ok_or(InvariantViolation::MissingNode(at))?;
    let recipe = recipes.production(node.name());
    let speed = recipe.map_or(1.0, |r| r.speed);

    *progress += config.production_increment * speed;
    trace!(unit = %unit, node = %at, progress = *progress, "producing");
    if !progress_complete(*progress) {
        return Ok(false);
    }

    if node.kind() != NodeKind::Production {
        return Err(InvariantViolation::WrongNodeKind {
            node: at,
            kind: node.kind(),
            expected: NodeKind::Production,
        });
    }
    if !node.is_built() {
        return Err(InvariantViolation::NodeNotBuilt(at));
    }
    let (outputs, unit_births) = recipe
        .map(|r| (r.outputs.clone(), r.unit_births))
        .unwrap_or_default();

    for &input in inputs {
        let kind = state
            .material(input)
            .ok_or(InvariantViolation::MissingMaterial(input))?
            .kind();
        state.unreserve(input)?;
        state.unstage_input(input, at)?;
        state.destroy_material(input)?;
        events.push(EventKind::MaterialConsumed {
            material: input,
            kind,
            node: at,
        });
    }

    for (kind, count) in outputs {
        for _ in 0..count {
            let material = state.mint_material(kind, MaterialSlot::Output(at))?;
            events.push(EventKind::MaterialCreated {
                material,
                kind,
                node: at,
            });
        }
    }

    for _ in 0..unit_births {
        let born = state.spawn_unit_at(at, UnitRole::Idle)?;
        info!(player = %state.id, unit = %born, node = %at, "unit hatched");
        events.push(EventKind::UnitCreated { unit: born, node: at });
    }

    Ok(true)
}

fn advance_building(
    state: &mut PlayerState,
    unit: UnitId,
    recipes: &RecipeCatalog,
    config: &SimulationConfig,
    events: &mut Vec<EventKind>,
) -> Outcome<bool> {
    let at = state.unit_location(unit)?;
    let node = state
        .graph
        .node(at)
        .ok_or(InvariantViolation::MissingNode(at))?;
    if node.is_built() {
        return Ok(true);
    }

    let completes = progress_complete(node.build_progress() + config.building_increment);
    let name = node.name();

    // Materials are checked before any progress is applied
    let consumed = if completes {
        let requirements = recipes.building_materials(name);
        let available = unreserved_input_counts(state, at);
        if let Some((missing, count)) = first_shortfall(requirements, &available) {
            return Err(InvariantViolation::RecipeUnsatisfied {
                node: at,
                missing,
                count,
            });
        }
        select_unreserved_inputs(state, at, requirements).unwrap_or_default()
    } else {
        Vec::new()
    };

    state
        .graph
        .node_mut(at)
        .ok_or(InvariantViolation::MissingNode(at))?
        .build(config.building_increment);
    trace!(unit = %unit, node = %at, "building");

    if !completes {
        return Ok(false);
    }

    for material in consumed {
        let kind = state
            .material(material)
            .ok_or(InvariantViolation::MissingMaterial(material))?
            .kind();
        state.unstage_input(material, at)?;
        state.destroy_material(material)?;
        events.push(EventKind::MaterialConsumed {
            material,
            kind,
            node: at,
        });
    }

    info!(player = %state.id, node = %at, name = %name, "node built");
    events.push(EventKind::NodeBuilt { node: at });
    Ok(true)
}

fn drop_material(state: &mut PlayerState, unit: UnitId, destination: NodeId) -> Outcome<bool> {
    let at = state.unit_location(unit)?;
    if at != destination {
        return Err(InvariantViolation::UnitAtWrongNode {
            unit,
            expected: destination,
            actual: at,
        });
    }
    let material = state
        .unit_ref(unit)?
        .material()
        .ok_or(InvariantViolation::NotCarrying(unit))?;
    state.unreserve(material)?;
    state.drop_carried(unit)?;
    Ok(true)
}
