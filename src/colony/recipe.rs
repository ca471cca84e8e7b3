//! Recipes - what a node needs to be built and what it produces
//!
//! Building recipes list the materials that must be staged as inputs before a
//! builder can finish a node. Production recipes list the inputs one cycle
//! consumes, the materials it outputs, and how many units it hatches.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colony::archetype::{NodeKind, NodeName};
use crate::colony::material::MaterialType;

/// Materials required to finish construction of an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecipe {
    pub node: NodeName,
    pub materials: Vec<(MaterialType, u32)>,
}

/// One production cycle of an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecipe {
    pub node: NodeName,
    /// Multiplier on the configured production increment
    pub speed: f64,
    /// Input materials consumed per cycle
    pub inputs: Vec<(MaterialType, u32)>,
    /// Output materials staged per cycle
    pub outputs: Vec<(MaterialType, u32)>,
    /// Idle units hatched per cycle
    pub unit_births: u32,
}

/// First requirement `available` cannot cover, with the shortfall
pub fn first_shortfall(
    requirements: &[(MaterialType, u32)],
    available: &AHashMap<MaterialType, u32>,
) -> Option<(MaterialType, u32)> {
    requirements.iter().find_map(|(kind, needed)| {
        let have = available.get(kind).copied().unwrap_or(0);
        (have < *needed).then(|| (*kind, needed - have))
    })
}

/// Catalog of building and production recipes keyed by archetype
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    building: BTreeMap<NodeName, BuildingRecipe>,
    production: BTreeMap<NodeName, ProductionRecipe>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard archetype tables
    pub fn with_defaults() -> Self {
        use MaterialType::*;
        use NodeName::*;

        let mut catalog = Self::new();

        let building: [(NodeName, Vec<(MaterialType, u32)>); 13] = [
            (SandTransit, vec![(Grass, 2), (Sand, 1)]),
            (GrassField, vec![(Grass, 3)]),
            (Well, vec![(Grass, 2), (Sand, 1)]),
            (SeedStorage, vec![(Grass, 3), (Dew, 1)]),
            (AphidDistillation, vec![(Grass, 4), (Dew, 2)]),
            (RawMaterialVat, vec![(Grass, 3), (Dew, 2), (Seed, 1)]),
            (ChitinPress, vec![(Grass, 2), (Sand, 2)]),
            (EggFarm, vec![(Seed, 3), (Sugar, 2)]),
            (PheromoneMine, vec![(Dew, 2), (Juice, 2), (Chitin, 2)]),
            (Incubator, vec![(Egg, 5), (Grass, 3)]),
            (GeneticHatchery, vec![(Egg, 7), (Juice, 5)]),
            (GuardOutpost, vec![(Chitin, 5), (Pheromone, 3)]),
            (AmberTurret, vec![(Juice, 5), (Amber, 3)]),
        ];
        for (node, materials) in building {
            catalog.add_building(BuildingRecipe { node, materials });
        }

        let production: [(NodeName, Vec<(MaterialType, u32)>, Vec<(MaterialType, u32)>, u32); 10] = [
            (GrassField, vec![], vec![(Grass, 1)], 0),
            (Well, vec![], vec![(Dew, 1)], 0),
            (SeedStorage, vec![], vec![(Seed, 1)], 0),
            (AphidDistillation, vec![(Dew, 1)], vec![(Sugar, 1)], 0),
            (RawMaterialVat, vec![(Dew, 1), (Seed, 1)], vec![(Juice, 1)], 0),
            (ChitinPress, vec![(Sand, 1)], vec![(Chitin, 1)], 0),
            (EggFarm, vec![(Seed, 1), (Sugar, 1)], vec![(Egg, 1)], 0),
            (PheromoneMine, vec![(Juice, 1), (Chitin, 1)], vec![(Pheromone, 1)], 0),
            (Incubator, vec![(Egg, 1), (Grass, 1)], vec![], 1),
            (GeneticHatchery, vec![(Egg, 1), (Juice, 1), (Pheromone, 1)], vec![], 1),
        ];
        for (node, inputs, outputs, unit_births) in production {
            catalog.add_production(ProductionRecipe {
                node,
                speed: 1.0,
                inputs,
                outputs,
                unit_births,
            });
        }

        catalog
    }

    pub fn add_building(&mut self, recipe: BuildingRecipe) {
        self.building.insert(recipe.node, recipe);
    }

    pub fn add_production(&mut self, recipe: ProductionRecipe) {
        self.production.insert(recipe.node, recipe);
    }

    /// Building requirements of an archetype; archetypes without a recipe need nothing
    pub fn building_materials(&self, node: NodeName) -> &[(MaterialType, u32)] {
        self.building
            .get(&node)
            .map(|r| r.materials.as_slice())
            .unwrap_or(&[])
    }

    pub fn production(&self, node: NodeName) -> Option<&ProductionRecipe> {
        self.production.get(&node)
    }

    /// Load recipes from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, RecipeLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecipeLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse recipes from TOML string
    pub fn parse_toml(content: &str) -> Result<Self, RecipeLoadError> {
        let toml_data: TomlRecipes =
            toml::from_str(content).map_err(|e| RecipeLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::new();
        for recipe in toml_data.building {
            let recipe = recipe.into_recipe()?;
            if catalog.building.contains_key(&recipe.node) {
                return Err(RecipeLoadError::Duplicate(recipe.node.to_string()));
            }
            catalog.add_building(recipe);
        }
        for recipe in toml_data.production {
            let recipe = recipe.into_recipe()?;
            if catalog.production.contains_key(&recipe.node) {
                return Err(RecipeLoadError::Duplicate(recipe.node.to_string()));
            }
            catalog.add_production(recipe);
        }
        Ok(catalog)
    }
}

/// Error type for recipe loading
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecipeLoadError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid node archetype: {0}")]
    InvalidNodeName(String),
    #[error("Invalid material type: {0}")]
    InvalidMaterialType(String),
    #[error("Zero amount of {0} in recipe")]
    ZeroAmount(String),
    #[error("Production speed must be positive for {0}")]
    InvalidSpeed(String),
    #[error("{0} is not a production archetype")]
    NotProduction(String),
    #[error("Duplicate recipe for {0}")]
    Duplicate(String),
}

/// TOML representation of a recipes file
#[derive(Debug, Deserialize)]
struct TomlRecipes {
    #[serde(default)]
    building: Vec<TomlBuildingRecipe>,
    #[serde(default)]
    production: Vec<TomlProductionRecipe>,
}

#[derive(Debug, Deserialize)]
struct TomlBuildingRecipe {
    node: String,
    #[serde(default)]
    materials: Vec<TomlMaterialAmount>,
}

#[derive(Debug, Deserialize)]
struct TomlProductionRecipe {
    node: String,
    #[serde(default = "default_speed")]
    speed: f64,
    #[serde(default)]
    inputs: Vec<TomlMaterialAmount>,
    #[serde(default)]
    outputs: Vec<TomlMaterialAmount>,
    #[serde(default)]
    unit_births: u32,
}

fn default_speed() -> f64 {
    1.0
}

/// TOML representation of a material amount
#[derive(Debug, Deserialize)]
struct TomlMaterialAmount {
    material: String,
    amount: u32,
}

fn parse_node_name(name: &str) -> Result<NodeName, RecipeLoadError> {
    NodeName::parse(name).ok_or_else(|| RecipeLoadError::InvalidNodeName(name.to_string()))
}

fn convert_amounts(
    amounts: Vec<TomlMaterialAmount>,
) -> Result<Vec<(MaterialType, u32)>, RecipeLoadError> {
    amounts
        .into_iter()
        .map(|ma| ma.into_material_amount())
        .collect()
}

impl TomlBuildingRecipe {
    fn into_recipe(self) -> Result<BuildingRecipe, RecipeLoadError> {
        Ok(BuildingRecipe {
            node: parse_node_name(&self.node)?,
            materials: convert_amounts(self.materials)?,
        })
    }
}

impl TomlProductionRecipe {
    fn into_recipe(self) -> Result<ProductionRecipe, RecipeLoadError> {
        let node = parse_node_name(&self.node)?;
        if node.kind() != NodeKind::Production {
            return Err(RecipeLoadError::NotProduction(self.node));
        }
        if !(self.speed > 0.0) {
            return Err(RecipeLoadError::InvalidSpeed(self.node));
        }

        Ok(ProductionRecipe {
            node,
            speed: self.speed,
            inputs: convert_amounts(self.inputs)?,
            outputs: convert_amounts(self.outputs)?,
            unit_births: self.unit_births,
        })
    }
}

impl TomlMaterialAmount {
    fn into_material_amount(self) -> Result<(MaterialType, u32), RecipeLoadError> {
        let kind = MaterialType::parse(&self.material)
            .ok_or_else(|| RecipeLoadError::InvalidMaterialType(self.material.clone()))?;
        if self.amount == 0 {
            return Err(RecipeLoadError::ZeroAmount(self.material));
        }
        Ok((kind, self.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_archetype_has_building_materials() {
        let catalog = RecipeCatalog::with_defaults();
        for name in NodeName::ALL {
            assert!(
                !catalog.building_materials(name).is_empty(),
                "{:?} should have building materials",
                name
            );
        }
    }

    #[test]
    fn test_production_only_for_production_kind() {
        let catalog = RecipeCatalog::with_defaults();
        for name in NodeName::ALL {
            let has_recipe = catalog.production(name).is_some();
            assert_eq!(has_recipe, name.kind() == NodeKind::Production, "{:?}", name);
        }
    }

    #[test]
    fn test_sand_transit_building_recipe() {
        let catalog = RecipeCatalog::with_defaults();
        let materials = catalog.building_materials(NodeName::SandTransit);
        assert!(materials.contains(&(MaterialType::Grass, 2)));
        assert!(materials.contains(&(MaterialType::Sand, 1)));
    }

    #[test]
    fn test_incubator_hatches_units() {
        let catalog = RecipeCatalog::with_defaults();
        let recipe = catalog.production(NodeName::Incubator).unwrap();
        assert_eq!(recipe.unit_births, 1);
        assert!(recipe.outputs.is_empty());
    }

    #[test]
    fn test_first_shortfall() {
        let mut available = AHashMap::new();
        available.insert(MaterialType::Grass, 2);
        let needs = [(MaterialType::Grass, 2), (MaterialType::Sand, 1)];
        assert_eq!(
            first_shortfall(&needs, &available),
            Some((MaterialType::Sand, 1))
        );

        available.insert(MaterialType::Sand, 3);
        assert_eq!(first_shortfall(&needs, &available), None);
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
            [[building]]
            node = "sand_transit"
            materials = [{ material = "grass", amount = 1 }]

            [[production]]
            node = "well"
            speed = 2.0
            outputs = [{ material = "dew", amount = 3 }]
        "#;
        let catalog = RecipeCatalog::parse_toml(content).unwrap();
        assert_eq!(
            catalog.building_materials(NodeName::SandTransit),
            &[(MaterialType::Grass, 1)]
        );
        let well = catalog.production(NodeName::Well).unwrap();
        assert_eq!(well.speed, 2.0);
        assert_eq!(well.outputs, vec![(MaterialType::Dew, 3)]);
        assert_eq!(well.unit_births, 0);
        // Archetypes missing from the file need nothing
        assert!(catalog.building_materials(NodeName::Well).is_empty());
    }

    #[test]
    fn test_parse_toml_rejects_unknown_names() {
        let bad_node = r#"
            [[building]]
            node = "castle"
        "#;
        assert_eq!(
            RecipeCatalog::parse_toml(bad_node).unwrap_err(),
            RecipeLoadError::InvalidNodeName("castle".into())
        );

        let bad_material = r#"
            [[building]]
            node = "well"
            materials = [{ material = "gold", amount = 1 }]
        "#;
        assert_eq!(
            RecipeCatalog::parse_toml(bad_material).unwrap_err(),
            RecipeLoadError::InvalidMaterialType("gold".into())
        );
    }

    #[test]
    fn test_parse_toml_rejects_bad_production() {
        let transit = r#"
            [[production]]
            node = "sand_transit"
        "#;
        assert!(matches!(
            RecipeCatalog::parse_toml(transit),
            Err(RecipeLoadError::NotProduction(_))
        ));

        let zero = r#"
            [[production]]
            node = "well"
            outputs = [{ material = "dew", amount = 0 }]
        "#;
        assert!(matches!(
            RecipeCatalog::parse_toml(zero),
            Err(RecipeLoadError::ZeroAmount(_))
        ));

        let stalled = r#"
            [[production]]
            node = "well"
            speed = 0.0
        "#;
        assert!(matches!(
            RecipeCatalog::parse_toml(stalled),
            Err(RecipeLoadError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_parse_toml_rejects_duplicates() {
        let content = r#"
            [[building]]
            node = "well"
            [[building]]
            node = "well"
        "#;
        assert!(matches!(
            RecipeCatalog::parse_toml(content),
            Err(RecipeLoadError::Duplicate(_))
        ));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        assert!(matches!(
            RecipeCatalog::parse_toml("[[building]\nnode ="),
            Err(RecipeLoadError::ParseError(_))
        ));
    }
}
