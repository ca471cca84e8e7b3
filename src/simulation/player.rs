//! Per-player aggregate: graph, unit and material arenas, id allocators, RNG

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::colony::archetype::NodeName;
use crate::colony::material::{Material, MaterialSlot, MaterialType};
use crate::colony::node::Node;
use crate::colony::recipe::RecipeCatalog;
use crate::core::config::SimulationConfig;
use crate::core::error::{InvariantViolation, Result, SimError};
use crate::core::types::{IdAllocator, MaterialId, NodeId, PlayerId, UnitId, Vec2};
use crate::entity::unit::{Unit, UnitRole};
use crate::simulation::events::EventKind;
use crate::simulation::{execute, policy};
use crate::spatial::graph::Graph;

/// Everything one player owns
///
/// Arenas are ordered maps so every pass over units, nodes or materials runs
/// in ascending id order.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub(crate) id: PlayerId,
    pub(crate) graph: Graph,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) materials: BTreeMap<MaterialId, Material>,
    pub(crate) node_ids: IdAllocator,
    pub(crate) unit_ids: IdAllocator,
    pub(crate) material_ids: IdAllocator,
    pub(crate) rng: ChaCha8Rng,
}

/// Seed of a player's decision RNG
pub fn player_seed(seed: u64, player: PlayerId) -> u64 {
    seed ^ u64::from(player.0).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl PlayerState {
    /// A player with a fully built Sand Transit root (node 1) at `root_position`
    pub fn new(id: PlayerId, root_position: Vec2, config: &SimulationConfig) -> Result<Self> {
        let mut node_ids = IdAllocator::new();
        let raw = node_ids
            .next_raw()
            .ok_or(InvariantViolation::IdsExhausted("node"))?;
        let root_id = NodeId::new(raw)?;
        let mut root = Node::new(root_id, NodeName::SandTransit, root_position, config.node_radius);
        root.build_fully();

        Ok(Self {
            id,
            graph: Graph::new(root),
            units: BTreeMap::new(),
            materials: BTreeMap::new(),
            node_ids,
            unit_ids: IdAllocator::new(),
            material_ids: IdAllocator::new(),
            rng: ChaCha8Rng::seed_from_u64(player_seed(config.seed, id)),
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> Option<&Node> {
        self.graph.nodes().next()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Number of materials of `kind` this player holds, staged or carried
    pub fn material_count(&self, kind: MaterialType) -> usize {
        self.materials.values().filter(|m| m.kind() == kind).count()
    }

    /// Identifier the next placed node will receive
    pub(crate) fn peek_node_id(&self) -> Result<NodeId> {
        NodeId::new(self.node_ids.peek())
    }

    /// Attach an already validated node to `from`
    pub(crate) fn commit_node(&mut self, from: NodeId, node: Node) -> Result<NodeId> {
        self.node_ids
            .next_raw()
            .ok_or(InvariantViolation::IdsExhausted("node"))?;
        Ok(self.graph.add_node_from(from, node)?)
    }

    /// Create a unit standing on `node`
    pub fn spawn_unit(&mut self, node: NodeId, role: UnitRole) -> Result<UnitId> {
        if !self.graph.contains(node) {
            return Err(SimError::NodeNotFound(node));
        }
        Ok(self.spawn_unit_at(node, role)?)
    }

    pub(crate) fn spawn_unit_at(
        &mut self,
        node: NodeId,
        role: UnitRole,
    ) -> std::result::Result<UnitId, InvariantViolation> {
        let id = self
            .unit_ids
            .next_raw()
            .and_then(|raw| UnitId::new(raw).ok())
            .ok_or(InvariantViolation::IdsExhausted("unit"))?;
        self.units.insert(id, Unit::new(id, role));
        self.place_unit(id, node)?;
        Ok(id)
    }

    /// Create a material staged in `slot`
    pub fn spawn_material(&mut self, kind: MaterialType, slot: MaterialSlot) -> Result<MaterialId> {
        if !self.graph.contains(slot.node()) {
            return Err(SimError::NodeNotFound(slot.node()));
        }
        Ok(self.mint_material(kind, slot)?)
    }

    pub(crate) fn mint_material(
        &mut self,
        kind: MaterialType,
        slot: MaterialSlot,
    ) -> std::result::Result<MaterialId, InvariantViolation> {
        let id = self
            .material_ids
            .next_raw()
            .and_then(|raw| MaterialId::new(raw).ok())
            .ok_or(InvariantViolation::IdsExhausted("material"))?;
        self.materials.insert(id, Material::new(id, kind));
        match slot {
            MaterialSlot::Input(node) => self.stage_input(id, node)?,
            MaterialSlot::Output(node) => self.stage_output(id, node)?,
        }
        Ok(id)
    }

    /// Mark a node as fully built without consuming anything
    pub fn complete_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.graph.node_mut(id).ok_or(SimError::NodeNotFound(id))?;
        node.build_fully();
        Ok(())
    }

    /// Change a unit's role, releasing whatever its discarded work had claimed
    pub fn change_unit_role(&mut self, unit: UnitId, role: UnitRole) -> Result<&Unit> {
        if !self.units.contains_key(&unit) {
            return Err(SimError::UnitNotFound(unit));
        }
        self.set_unit_role(unit, role)?;
        self.units
            .get(&unit)
            .ok_or(SimError::UnitNotFound(unit))
    }

    /// One tick of this player: poll idle units, then advance busy ones
    pub fn tick(
        &mut self,
        recipes: &RecipeCatalog,
        config: &SimulationConfig,
    ) -> std::result::Result<Vec<EventKind>, InvariantViolation> {
        let mut events = Vec::new();

        let idle: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| u.is_idle())
            .map(|u| u.id())
            .collect();
        for &unit in &idle {
            policy::poll(self, unit, recipes, config)?;
        }

        // Units hatched during this pass wait for the next tick
        let busy: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| !u.is_idle())
            .map(|u| u.id())
            .filter(|id| idle.binary_search(id).is_err())
            .collect();
        for unit in busy {
            execute::execute_front(self, unit, recipes, config, &mut events)?;
        }

        let births = events
            .iter()
            .filter(|e| matches!(e, EventKind::UnitCreated { .. }))
            .count();
        if births > 0 {
            info!(player = %self.id, births, "units hatched");
        }

        Ok(events)
    }
}
