use std::sync::Arc;

use crate::core::{DomainError, Result, Value};
use crate::schema::{CollectionKind, EntitySchema, PropertyId, SlotDef};
use crate::store::slot::{ListSlot, ScalarSlot, Slot};
use crate::tracker::CompensatingAction;
use crate::validate::ValidationReport;

/// Per-instance property storage: one slot per schema entry, indexed by
/// [`PropertyId`] in declaration order.
///
/// The store never validates on its own; whole-object validation is the
/// change tracker's responsibility.
#[derive(Debug)]
pub struct PropertyStore {
    schema: Arc<EntitySchema>,
    slots: Vec<Slot>,
}

impl PropertyStore {
    /// Seed every slot with its declared default. Defaults count as
    /// committed values, so a freshly built store has no dirty properties.
    pub(crate) fn new(schema: Arc<EntitySchema>) -> Self {
        let slots = schema
            .slots()
            .iter()
            .map(|slot| match slot {
                SlotDef::Scalar(def) => Slot::Scalar(ScalarSlot {
                    current: def.default_value().clone(),
                    committed: def.default_value().clone(),
                }),
                SlotDef::Collection(def) => Slot::List(ListSlot {
                    kind: def.kind(),
                    items: Vec::new(),
                    committed: Vec::new(),
                }),
            })
            .collect();

        Self { schema, slots }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub(crate) fn slot_of(&self, name: &str) -> Result<PropertyId> {
        self.schema.slot_of(name).ok_or_else(|| {
            DomainError::UnknownProperty(name.to_string(), self.schema.type_name().to_string())
        })
    }

    /// Current value of a scalar property.
    pub fn get(&self, name: &str) -> Result<&Value> {
        let id = self.slot_of(name)?;
        match &self.slots[id] {
            Slot::Scalar(slot) => Ok(&slot.current),
            Slot::List(_) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is a collection",
                name,
                self.schema.type_name()
            ))),
        }
    }

    /// Current contents of a collection property (either kind).
    pub fn list(&self, name: &str) -> Result<&[Value]> {
        let id = self.slot_of(name)?;
        match &self.slots[id] {
            Slot::List(slot) => Ok(&slot.items),
            Slot::Scalar(_) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is not a collection",
                name,
                self.schema.type_name()
            ))),
        }
    }

    /// True iff the property's current value differs from the value recorded
    /// at the last successful commit.
    pub fn is_dirty(&self, name: &str) -> Result<bool> {
        let id = self.slot_of(name)?;
        Ok(match &self.slots[id] {
            Slot::Scalar(slot) => slot.is_dirty(),
            Slot::List(slot) => slot.is_dirty(),
        })
    }

    /// Buffered scalar write: kind-checked, applied immediately, returns the
    /// compensating action that restores the prior value.
    pub(crate) fn write_scalar(
        &mut self,
        name: &str,
        value: Value,
    ) -> Result<CompensatingAction> {
        let id = self.slot_of(name)?;
        if let Some(def) = self.schema.property(name) {
            def.check_kind(&value)?;
        }
        match &mut self.slots[id] {
            Slot::Scalar(slot) => {
                let prior = std::mem::replace(&mut slot.current, value);
                Ok(CompensatingAction::RestoreScalar { slot: id, prior })
            }
            Slot::List(_) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is a collection",
                name,
                self.schema.type_name()
            ))),
        }
    }

    /// Initialization write: seeds both current and committed values, so the
    /// property starts clean. No compensating action is produced.
    pub(crate) fn seed_scalar(&mut self, name: &str, value: Value) -> Result<()> {
        let id = self.slot_of(name)?;
        if let Some(def) = self.schema.property(name) {
            def.check_kind(&value)?;
        }
        match &mut self.slots[id] {
            Slot::Scalar(slot) => {
                slot.current = value.clone();
                slot.committed = value;
                Ok(())
            }
            Slot::List(_) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is a collection",
                name,
                self.schema.type_name()
            ))),
        }
    }

    /// Kind-checked mutable access to a collection's backing sequence.
    pub(crate) fn open_list(
        &mut self,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(PropertyId, &mut Vec<Value>)> {
        let id = self.slot_of(name)?;
        match &mut self.slots[id] {
            Slot::List(slot) if slot.kind == kind => Ok((id, &mut slot.items)),
            Slot::List(slot) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is a {} collection",
                name,
                self.schema.type_name(),
                slot.kind
            ))),
            Slot::Scalar(_) => Err(DomainError::TypeMismatch(format!(
                "Property '{}' on '{}' is not a collection",
                name,
                self.schema.type_name()
            ))),
        }
    }

    /// Raw slot access used when replaying compensating actions.
    pub(crate) fn restore_scalar(&mut self, id: PropertyId, prior: Value) {
        if let Slot::Scalar(slot) = &mut self.slots[id] {
            slot.current = prior;
        }
    }

    pub(crate) fn list_mut(&mut self, id: PropertyId) -> &mut Vec<Value> {
        match &mut self.slots[id] {
            Slot::List(slot) => &mut slot.items,
            // Compensating actions carry the slot id they were created with;
            // a scalar here means the undo log is corrupt.
            Slot::Scalar(_) => unreachable!("compensating action targets a scalar slot"),
        }
    }

    /// Record the current state as the committed state, for every slot.
    pub(crate) fn commit_all(&mut self) {
        for slot in &mut self.slots {
            match slot {
                Slot::Scalar(slot) => slot.committed = slot.current.clone(),
                Slot::List(slot) => slot.committed = slot.items.clone(),
            }
        }
    }

    /// Evaluate every declared property rule against the current values.
    pub(crate) fn validate_into(&self, report: &mut ValidationReport) {
        for (id, def) in self.schema.slots().iter().enumerate() {
            if let SlotDef::Scalar(def) = def {
                if let Slot::Scalar(slot) = &self.slots[id] {
                    def.validate_value(&slot.current, report);
                }
            }
        }
    }
}
