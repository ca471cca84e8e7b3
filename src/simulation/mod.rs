pub mod events;
pub mod execute;
pub mod ownership;
pub mod player;
pub mod policy;
pub mod snapshot;
pub mod tick;

pub use events::{Event, EventKind, EventLog};
pub use player::PlayerState;
pub use snapshot::PlayerSnapshot;
pub use tick::Simulation;
