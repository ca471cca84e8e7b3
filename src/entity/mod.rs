pub mod actions;
pub mod unit;

pub use actions::{Action, ActionKind, ActionQueue};
pub use unit::{Unit, UnitRole};
