//! Simulation configuration with documented constants
//!
//! All tunable numbers of the tick loop live here. The defaults reproduce the
//! pacing the clients animate against (10 ticks per second).

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === CLOCK ===
    /// Ticks per second of wall-clock time
    ///
    /// Only used to convert movement durations into milliseconds for clients.
    pub tick_rate: u32,

    // === GEOMETRY ===
    /// Base collision radius of a node (world units)
    ///
    /// Each node kind scales this (production nodes are twice as wide).
    pub node_radius: f64,

    /// Maximum center-to-center distance between a new node and the node it
    /// is attached to
    pub max_build_distance: f64,

    // === UNITS ===
    /// World units a unit travels per tick along an edge
    ///
    /// At 0.135 a 10-unit edge takes about 74 ticks (7.4 seconds).
    pub unit_speed: f64,

    // === WORK RATES ===
    /// Progress added to a Production action per tick, before the recipe's
    /// speed multiplier
    ///
    /// At 0.1 per tick a production cycle completes in 10 ticks.
    pub production_increment: f64,

    /// Build progress added per tick by one Building action
    ///
    /// At 0.1 per tick a single builder finishes a node in 10 ticks.
    pub building_increment: f64,

    // === PARALLELIZATION ===
    /// Minimum player count before players are ticked in parallel
    pub parallel_threshold: usize,

    // === DETERMINISM ===
    /// Seed for every player's decision RNG
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10,
            node_radius: 1.0,
            max_build_distance: 10.0,
            unit_speed: 0.135,
            production_increment: 0.1,
            building_increment: 0.1,
            parallel_threshold: 8,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(SimError::InvalidConfig("tick_rate must be positive".into()));
        }

        if self.node_radius <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "node_radius ({}) must be positive",
                self.node_radius
            )));
        }

        // A new node must fit outside the disk of the node it hangs from
        if self.max_build_distance <= 2.0 * self.node_radius {
            return Err(SimError::InvalidConfig(format!(
                "max_build_distance ({}) should exceed twice node_radius ({})",
                self.max_build_distance, self.node_radius
            )));
        }

        if self.unit_speed <= 0.0 {
            return Err(SimError::InvalidConfig("unit_speed must be positive".into()));
        }

        if self.production_increment <= 0.0 || self.building_increment <= 0.0 {
            return Err(SimError::InvalidConfig(
                "work increments must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Milliseconds a unit needs to cover `distance` at `speed`
    pub fn travel_time_ms(&self, distance: f64, speed: f64) -> f64 {
        let ticks = distance / speed;
        ticks * (1000.0 / self.tick_rate as f64)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// The config is validated first. Returns Err if it is invalid or a config
/// was already set.
pub fn set_config(config: SimulationConfig) -> Result<()> {
    config.validate()?;
    CONFIG.set(config).map_err(|_| SimError::ConfigAlreadySet)
}
