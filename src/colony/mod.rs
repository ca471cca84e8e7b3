//! Colony data model: archetypes, materials, nodes and recipes

pub mod archetype;
pub mod material;
pub mod node;
pub mod recipe;

pub use archetype::{NodeKind, NodeName};
pub use material::{Material, MaterialSlot, MaterialType};
pub use node::{progress_complete, Node, PROGRESS_EPSILON};
pub use recipe::{BuildingRecipe, ProductionRecipe, RecipeCatalog, RecipeLoadError};
