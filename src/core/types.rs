//! Core type definitions used throughout the codebase

use std::num::NonZeroU32;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::error::SimError;

/// Simulation tick counter
pub type Tick = u64;

/// Defines a per-player entity identifier.
///
/// Identifiers are positive integers; zero is rejected at construction.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn new(value: u32) -> Result<Self, SimError> {
                NonZeroU32::new(value)
                    .map(Self)
                    .ok_or(SimError::InvalidId { kind: $kind })
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

entity_id!(
    /// Identifier of a node within one player's graph
    NodeId,
    "node"
);
entity_id!(
    /// Identifier of a unit owned by one player
    UnitId,
    "unit"
);
entity_id!(
    /// Identifier of a material owned by one player
    MaterialId,
    "material"
);

/// Identifier of a player (one independent subgraph)
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

/// Hands out sequential identifiers starting at 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    pub(crate) next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Hand out the next identifier, or `None` once the range is used up
    pub fn next_raw(&mut self) -> Option<u32> {
        let id = self.next;
        self.next = id.checked_add(1)?;
        Some(id)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            *self
        }
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
