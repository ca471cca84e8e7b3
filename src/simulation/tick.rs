//! Simulation driver - owns all players and runs the tick loop
//!
//! Each player's subgraph is independent, so players are ticked in parallel
//! with rayon once there are enough of them. Events are merged in player
//! order either way, which keeps the log identical between both modes.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::colony::archetype::NodeName;
use crate::colony::node::Node;
use crate::colony::recipe::RecipeCatalog;
use crate::core::config::SimulationConfig;
use crate::core::error::{InvariantViolation, Result, SimError};
use crate::core::types::{NodeId, PlayerId, Tick, UnitId, Vec2};
use crate::entity::unit::{Unit, UnitRole};
use crate::simulation::events::{Event, EventKind, EventLog};
use crate::simulation::player::PlayerState;
use crate::simulation::snapshot::PlayerSnapshot;

pub struct Simulation {
    config: SimulationConfig,
    recipes: RecipeCatalog,
    players: BTreeMap<PlayerId, PlayerState>,
    current_tick: Tick,
    events: EventLog,
}

impl Simulation {
    pub fn new(config: SimulationConfig, recipes: RecipeCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recipes,
            players: BTreeMap::new(),
            current_tick: 0,
            events: EventLog::new(),
        })
    }

    /// Process-wide config with the standard recipe tables
    pub fn with_defaults() -> Self {
        Self {
            config: crate::core::config::config().clone(),
            recipes: RecipeCatalog::with_defaults(),
            players: BTreeMap::new(),
            current_tick: 0,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn recipes(&self) -> &RecipeCatalog {
        &self.recipes
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Register a player whose graph starts with a built root at `root_position`
    pub fn add_player(&mut self, player: PlayerId, root_position: Vec2) -> Result<&mut PlayerState> {
        if self.players.contains_key(&player) {
            return Err(SimError::DuplicatePlayer(player));
        }
        let state = PlayerState::new(player, root_position, &self.config)?;
        if let Some(root) = state.root() {
            if let Some(other) = self.first_intersecting_player(root) {
                return Err(SimError::Intersects(other));
            }
        }

        info!(player = %player, x = root_position.x, y = root_position.y, "player added");
        Ok(self.players.entry(player).or_insert(state))
    }

    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        self.players.get(&player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&player)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    fn first_intersecting_player(&self, candidate: &Node) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.graph().intersects_any(candidate))
            .map(|p| p.id())
    }

    /// Advance every player by one tick
    ///
    /// Every player runs even if another one hits an invariant violation.
    /// Events of players that finished cleanly are recorded; the failing
    /// player's events for this tick are dropped and the first violation in
    /// player order is returned. Mutations made before the violation stay.
    pub fn tick(&mut self) -> Result<()> {
        self.current_tick += 1;
        let tick = self.current_tick;
        let recipes = &self.recipes;
        let config = &self.config;

        let results: Vec<(PlayerId, std::result::Result<Vec<EventKind>, InvariantViolation>)> =
            if self.players.len() >= config.parallel_threshold {
                self.players
                    .par_iter_mut()
                    .map(|(id, state)| (*id, state.tick(recipes, config)))
                    .collect()
            } else {
                self.players
                    .iter_mut()
                    .map(|(id, state)| (*id, state.tick(recipes, config)))
                    .collect()
            };

        let mut first_violation = None;
        for (player, result) in results {
            match result {
                Ok(events) => {
                    for kind in events {
                        self.events.push(tick, player, kind);
                    }
                }
                Err(violation) => {
                    tracing::error!(player = %player, tick, %violation, "tick aborted");
                    first_violation.get_or_insert(violation);
                }
            }
        }

        match first_violation {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        }
    }

    /// Place a new unbuilt node attached to `from`
    ///
    /// The candidate is checked against every player's graph before anything
    /// is committed.
    pub fn build_node(
        &mut self,
        player: PlayerId,
        from: NodeId,
        name: NodeName,
        position: Vec2,
    ) -> Result<NodeId> {
        let state = self
            .players
            .get(&player)
            .ok_or(SimError::PlayerNotFound(player))?;
        let anchor = state.graph().node(from).ok_or(SimError::NodeNotFound(from))?;

        let id = state.peek_node_id()?;
        let candidate = Node::new(id, name, position, self.config.node_radius);

        let distance = anchor.distance_to(&candidate);
        let max = self.config.max_build_distance;
        if distance > max {
            debug!(player = %player, from = %from, distance, "placement rejected: too far");
            return Err(SimError::TooFar { distance, max });
        }

        if let Some(other) = self.first_intersecting_player(&candidate) {
            debug!(player = %player, other = %other, "placement rejected: intersects");
            return Err(SimError::Intersects(other));
        }

        if state.graph().contains(id) {
            return Err(SimError::DuplicateId(id));
        }

        let state = self
            .players
            .get_mut(&player)
            .ok_or(SimError::PlayerNotFound(player))?;
        let id = state.commit_node(from, candidate)?;
        debug!(player = %player, node = %id, name = %name, "node placed");
        Ok(id)
    }

    /// Reassign a unit's role; see `PlayerState::change_unit_role`
    pub fn change_unit_type(&mut self, player: PlayerId, unit: UnitId, role: UnitRole) -> Result<&Unit> {
        let state = self
            .players
            .get_mut(&player)
            .ok_or(SimError::PlayerNotFound(player))?;
        state.change_unit_role(unit, role)
    }

    pub fn snapshot(&self, player: PlayerId) -> Result<PlayerSnapshot> {
        let state = self
            .players
            .get(&player)
            .ok_or(SimError::PlayerNotFound(player))?;
        Ok(PlayerSnapshot::capture(state, self.current_tick))
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
