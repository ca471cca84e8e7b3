pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{InvariantViolation, Result, SimError};
pub use types::{IdAllocator, MaterialId, NodeId, PlayerId, Tick, UnitId, Vec2};
