//! Ownership protocol
//!
//! Every material has at most one owner: a node input set, a node output set,
//! or the unit carrying it. Every unit sits on at most one node. These helpers
//! are the only code that moves ids between sets, and each one keeps both
//! sides of a relationship in step. A failed check means a bug in the caller
//! and is reported as an `InvariantViolation`.

use crate::colony::material::MaterialSlot;
use crate::core::error::InvariantViolation;
use crate::core::types::{MaterialId, NodeId, UnitId};
use crate::entity::actions::ActionKind;
use crate::entity::unit::{Unit, UnitRole};
use crate::simulation::player::PlayerState;

type Outcome<T = ()> = Result<T, InvariantViolation>;

impl PlayerState {
    pub(crate) fn unit_ref(&self, unit: UnitId) -> Outcome<&Unit> {
        self.units
            .get(&unit)
            .ok_or(InvariantViolation::MissingUnit(unit))
    }

    pub(crate) fn unit_mut(&mut self, unit: UnitId) -> Outcome<&mut Unit> {
        self.units
            .get_mut(&unit)
            .ok_or(InvariantViolation::MissingUnit(unit))
    }

    /// Node the unit currently stands on
    pub(crate) fn unit_location(&self, unit: UnitId) -> Outcome<NodeId> {
        self.unit_ref(unit)?
            .node()
            .ok_or(InvariantViolation::UnitNotAtNode(unit))
    }

    fn stage(&mut self, material: MaterialId, slot: MaterialSlot) -> Outcome {
        let node_id = slot.node();
        let entry = self
            .materials
            .get_mut(&material)
            .ok_or(InvariantViolation::MissingMaterial(material))?;
        if entry.slot().is_some() {
            return Err(InvariantViolation::MaterialAlreadyOwned(material));
        }
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or(InvariantViolation::MissingNode(node_id))?;

        match slot {
            MaterialSlot::Input(_) => node.input_materials_mut().insert(material),
            MaterialSlot::Output(_) => node.output_materials_mut().insert(material),
        };
        entry.set_slot(Some(slot));
        Ok(())
    }

    fn unstage(&mut self, material: MaterialId, slot: MaterialSlot) -> Outcome {
        let node_id = slot.node();
        let entry = self
            .materials
            .get_mut(&material)
            .ok_or(InvariantViolation::MissingMaterial(material))?;
        if entry.slot() != Some(slot) {
            return Err(InvariantViolation::MaterialNotStaged {
                material,
                node: node_id,
                slot: if slot.is_input() { "input" } else { "output" },
            });
        }
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or(InvariantViolation::MissingNode(node_id))?;

        match slot {
            MaterialSlot::Input(_) => node.input_materials_mut().remove(&material),
            MaterialSlot::Output(_) => node.output_materials_mut().remove(&material),
        };
        entry.set_slot(None);
        Ok(())
    }

    pub(crate) fn stage_input(&mut self, material: MaterialId, node: NodeId) -> Outcome {
        self.stage(material, MaterialSlot::Input(node))
    }

    pub(crate) fn stage_output(&mut self, material: MaterialId, node: NodeId) -> Outcome {
        self.stage(material, MaterialSlot::Output(node))
    }

    pub(crate) fn unstage_input(&mut self, material: MaterialId, node: NodeId) -> Outcome {
        self.unstage(material, MaterialSlot::Input(node))
    }

    pub(crate) fn unstage_output(&mut self, material: MaterialId, node: NodeId) -> Outcome {
        self.unstage(material, MaterialSlot::Output(node))
    }

    pub(crate) fn reserve(&mut self, material: MaterialId) -> Outcome {
        let entry = self
            .materials
            .get_mut(&material)
            .ok_or(InvariantViolation::MissingMaterial(material))?;
        if entry.is_reserved() {
            return Err(InvariantViolation::AlreadyReserved(material));
        }
        entry.set_reserved(true);
        Ok(())
    }

    pub(crate) fn unreserve(&mut self, material: MaterialId) -> Outcome {
        let entry = self
            .materials
            .get_mut(&material)
            .ok_or(InvariantViolation::MissingMaterial(material))?;
        if !entry.is_reserved() {
            return Err(InvariantViolation::NotReserved(material));
        }
        entry.set_reserved(false);
        Ok(())
    }

    /// Remove an unowned material from the arena
    pub(crate) fn destroy_material(&mut self, material: MaterialId) -> Outcome {
        let entry = self
            .materials
            .get(&material)
            .ok_or(InvariantViolation::MissingMaterial(material))?;
        if entry.slot().is_some() {
            return Err(InvariantViolation::MaterialStillOwned(material));
        }
        self.materials.remove(&material);
        Ok(())
    }

    pub(crate) fn place_unit(&mut self, unit: UnitId, node_id: NodeId) -> Outcome {
        if self.unit_ref(unit)?.node().is_some() {
            return Err(InvariantViolation::UnitAlreadyPlaced(unit));
        }
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or(InvariantViolation::MissingNode(node_id))?;
        node.units_mut().insert(unit);
        self.unit_mut(unit)?.set_node(Some(node_id));
        Ok(())
    }

    /// Take a unit off `expected`, leaving it in transit
    pub(crate) fn detach_unit(&mut self, unit: UnitId, expected: NodeId) -> Outcome {
        let actual = self.unit_location(unit)?;
        if actual != expected {
            return Err(InvariantViolation::UnitAtWrongNode {
                unit,
                expected,
                actual,
            });
        }
        let node = self
            .graph
            .node_mut(actual)
            .ok_or(InvariantViolation::MissingNode(actual))?;
        node.units_mut().remove(&unit);
        self.unit_mut(unit)?.set_node(None);
        Ok(())
    }

    /// Transfer an output material at the unit's node into its hands
    pub(crate) fn pickup(&mut self, unit: UnitId, material: MaterialId) -> Outcome {
        let carrier = self.unit_ref(unit)?;
        if carrier.role() != UnitRole::Transporter {
            return Err(InvariantViolation::NotTransporter {
                unit,
                role: carrier.role(),
            });
        }
        if carrier.material().is_some() {
            return Err(InvariantViolation::AlreadyCarrying(unit));
        }
        let node = self.unit_location(unit)?;

        self.unstage_output(material, node)?;
        self.unit_mut(unit)?.set_material(Some(material));
        Ok(())
    }

    /// Stage the carried material as an input at the unit's node
    pub(crate) fn drop_carried(&mut self, unit: UnitId) -> Outcome<MaterialId> {
        let material = self
            .unit_ref(unit)?
            .material()
            .ok_or(InvariantViolation::NotCarrying(unit))?;
        let node = self.unit_location(unit)?;

        self.unit_mut(unit)?.set_material(None);
        self.stage_input(material, node)?;
        Ok(material)
    }

    /// Switch roles, discarding queued work and releasing its claims
    ///
    /// A carried material goes back on the map as an output: at the unit's
    /// node, or at the node it left if it is mid-edge. A Moving action that
    /// has already started stays at the head of the queue.
    pub(crate) fn set_unit_role(&mut self, unit: UnitId, role: UnitRole) -> Outcome {
        if self.unit_ref(unit)?.role() == role {
            return Ok(());
        }

        let discarded = self.unit_mut(unit)?.actions_mut().clear_keeping_move();
        for action in discarded {
            match action.kind {
                ActionKind::Production { inputs, .. } => {
                    for input in inputs {
                        self.unreserve(input)?;
                    }
                }
                ActionKind::TakeMaterial { material } => {
                    let still_staged = self
                        .materials
                        .get(&material)
                        .is_some_and(|m| m.slot().is_some());
                    if still_staged {
                        self.unreserve(material)?;
                    }
                }
                _ => {}
            }
        }

        let carrier = self.unit_ref(unit)?;
        if let Some(material) = carrier.material() {
            let home = match carrier.node() {
                Some(node) => node,
                None => match carrier.actions().front().map(|a| &a.kind) {
                    Some(ActionKind::Moving { from, .. }) => *from,
                    _ => return Err(InvariantViolation::TransitWithoutMove(unit)),
                },
            };
            self.unit_mut(unit)?.set_material(None);
            if self.material(material).is_some_and(|m| m.is_reserved()) {
                self.unreserve(material)?;
            }
            self.stage_output(material, home)?;
        }

        self.unit_mut(unit)?.set_role(role);
        Ok(())
    }
}
