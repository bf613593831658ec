use std::any::TypeId;

use log::debug;

use crate::collections::ChildCollection;
use crate::core::{DomainError, Identifier, Result, Value};
use crate::schema::{schema_of, CollectionKind, SchemaBuilder};
use crate::store::PropertyStore;
use crate::tracker::{ChangeTracker, CompensatingAction, TrackingMode};
use crate::validate::ValidationReport;

/// Identity, property storage and transaction bookkeeping for one entity
/// instance. Concrete entity types embed one of these and hand out access
/// through the [`Entity`] trait.
#[derive(Debug)]
pub struct EntityState {
    id: Identifier,
    store: PropertyStore,
    tracker: ChangeTracker,
}

impl EntityState {
    /// Build the state for a fresh, transient instance of `T`: nil
    /// identifier, every property at its declared default, tracker armed.
    pub fn transient<T: Entity>() -> Result<Self> {
        let schema = schema_of::<T>()?;
        Ok(Self {
            id: Identifier::nil(),
            store: PropertyStore::new(schema),
            tracker: ChangeTracker::new(),
        })
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_nil()
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    /// Assign the identifier. Allowed exactly once, with a non-nil value.
    ///
    /// # Errors
    /// `IdentityViolation` if the identifier is already set or the value is
    /// nil. Raised before any mutation.
    pub fn set_id(&mut self, id: Identifier) -> Result<()> {
        if id.is_nil() {
            return Err(DomainError::IdentityViolation(
                "cannot assign the nil identifier".to_string(),
            ));
        }
        if !self.id.is_nil() {
            return Err(DomainError::IdentityViolation(format!(
                "identifier is already set to {}",
                self.id
            )));
        }
        // Inside a buffered transaction the assignment joins the undo log so
        // a failed transaction leaves the instance transient again.
        if self.tracker.mode() == TrackingMode::Buffering {
            self.tracker
                .record(CompensatingAction::RestoreIdentity { prior: self.id });
        }
        self.id = id;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.store.get(name)
    }

    pub fn list(&self, name: &str) -> Result<&[Value]> {
        self.store.list(name)
    }

    pub fn is_dirty(&self, name: &str) -> Result<bool> {
        self.store.is_dirty(name)
    }

    pub(crate) fn seed(&mut self, name: &str, value: Value) -> Result<()> {
        self.store.seed_scalar(name, value)
    }

    pub(crate) fn buffered_write(&mut self, name: &str, value: Value) -> Result<()> {
        let action = self.store.write_scalar(name, value)?;
        self.tracker.record(action);
        Ok(())
    }

    /// Borrow-scoped mutator over a child collection. Only reachable while a
    /// transaction is open; in `Armed` mode this is a contract error.
    pub fn collection(&mut self, name: &str) -> Result<ChildCollection<'_>> {
        let mode = self.tracker.mode();
        if !mode.is_transaction_open() {
            return Err(DomainError::TransactionState(format!(
                "collection '{}' can only be mutated inside an open transaction",
                name
            )));
        }
        let Self { store, tracker, .. } = self;
        let (slot, items) = store.open_list(name, CollectionKind::Child)?;
        let journal = match mode {
            // Initialization seeds contents without undo records
            TrackingMode::Initializing => None,
            _ => Some(tracker.log_mut()),
        };
        Ok(ChildCollection::new(name, slot, items, journal))
    }

    pub(crate) fn record_membership_added(&mut self, name: &str, value: Value) -> Result<()> {
        let mode = self.tracker.mode();
        if !mode.is_transaction_open() {
            return Err(DomainError::TransactionState(format!(
                "collection '{}' can only be mutated inside an open transaction",
                name
            )));
        }
        if value.is_null() {
            return Err(DomainError::NullElement(format!(
                "collection '{}' does not accept null elements",
                name
            )));
        }
        let Self { store, tracker, .. } = self;
        let (slot, items) = store.open_list(name, CollectionKind::ValueObject)?;
        items.push(value);
        if mode == TrackingMode::Buffering {
            let index = items.len() - 1;
            tracker.record(CompensatingAction::UndoInsert { slot, index });
        }
        Ok(())
    }

    pub(crate) fn record_membership_removed(&mut self, name: &str, value: &Value) -> Result<bool> {
        let mode = self.tracker.mode();
        if !mode.is_transaction_open() {
            return Err(DomainError::TransactionState(format!(
                "collection '{}' can only be mutated inside an open transaction",
                name
            )));
        }
        let Self { store, tracker, .. } = self;
        let (slot, items) = store.open_list(name, CollectionKind::ValueObject)?;
        let Some(index) = items.iter().position(|item| item == value) else {
            return Ok(false);
        };
        let removed = items.remove(index);
        if mode == TrackingMode::Buffering {
            tracker.record(CompensatingAction::UndoRemoveAt {
                slot,
                index,
                removed,
            });
        }
        Ok(true)
    }

    pub(crate) fn finish_initializing(&mut self) {
        self.tracker.finish_initializing();
        // Seeded collection contents become the committed baseline.
        self.store.commit_all();
    }

    /// Resolve the open transaction: keep the changes or replay every
    /// compensating action in reverse chronological order. The log is
    /// consumed exactly once either way.
    pub(crate) fn resolve(&mut self, valid: bool) {
        let mut log = self.tracker.take_log();
        if valid {
            debug!("commit: {} change(s) kept", log.len());
            self.store.commit_all();
        } else {
            debug!("rollback: {} change(s) reverted", log.len());
            while let Some(action) = log.pop() {
                action.revert(&mut self.id, &mut self.store);
            }
        }
    }

    pub(crate) fn validate_into(&self, report: &mut ValidationReport) {
        self.store.validate_into(report);
    }
}

/// Hashable stand-in for an entity used as a map key: runtime type plus
/// identifier. Only obtainable once the entity is no longer transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    type_id: TypeId,
    id: Identifier,
}

impl EntityKey {
    pub fn id(&self) -> Identifier {
        self.id
    }
}

/// A mutable domain object with a stable identifier.
///
/// Implementors embed an [`EntityState`] and declare their schema; every
/// mutation then flows through the change tracker, which enforces
/// all-or-nothing semantics across scalar and collection writes.
pub trait Entity: Sized + 'static {
    /// Declarative schema for this type: defaults, rules, collections.
    /// Built once per process and shared by all instances.
    fn define_schema() -> SchemaBuilder;

    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    /// Cross-field validation hook, invoked after the per-property rules on
    /// every transaction resolution.
    fn check(&self, _report: &mut ValidationReport) {}

    fn id(&self) -> Identifier {
        self.state().id()
    }

    /// An entity is transient until a non-nil identifier is assigned.
    fn is_transient(&self) -> bool {
        self.state().is_transient()
    }

    fn set_id(&mut self, id: Identifier) -> Result<()> {
        self.state_mut().set_id(id)
    }

    fn get(&self, name: &str) -> Result<&Value> {
        self.state().get(name)
    }

    /// Read view over a tracked collection, either kind.
    fn items(&self, name: &str) -> Result<&[Value]> {
        self.state().list(name)
    }

    fn is_dirty(&self, name: &str) -> Result<bool> {
        self.state().is_dirty(name)
    }

    /// Run the whole-object validator: every declared property rule (the
    /// required rule first), then the [`check`](Entity::check) hook.
    fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        self.state().validate_into(&mut report);
        self.check(&mut report);
        report
    }

    /// Seed computed defaults during construction. Writes bypass validation
    /// and record no compensating actions. Usable exactly once per instance.
    ///
    /// # Errors
    /// Propagates faults from `seed`; fails if initialization already ran.
    fn initialize(&mut self, seed: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.state_mut().tracker_mut().begin_initializing()?;
        let outcome = seed(self);
        self.state_mut().finish_initializing();
        outcome
    }

    /// Write one property.
    ///
    /// In `Armed` mode the write is its own transaction: it is applied,
    /// validated against the whole object and, when invalid, reverted before
    /// the failure is raised as `DomainError::Validation`. Inside an open
    /// transaction the write is only recorded; validation is deferred.
    fn set_property(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.state().tracker().mode() {
            TrackingMode::Initializing => self.state_mut().seed(name, value),
            TrackingMode::Buffering => self.state_mut().buffered_write(name, value),
            TrackingMode::Armed => {
                self.state_mut().tracker_mut().begin_buffering()?;
                if let Err(fault) = self.state_mut().buffered_write(name, value) {
                    self.state_mut().resolve(false);
                    return Err(fault);
                }
                let report = self.validate();
                let valid = report.is_valid();
                self.state_mut().resolve(valid);
                if valid {
                    Ok(())
                } else {
                    Err(DomainError::Validation(report))
                }
            }
        }
    }

    /// Run a buffered transaction: any number of scalar and collection
    /// mutations, validated as a whole when `update` returns. On an invalid
    /// report every recorded change is rolled back and the report is
    /// returned as data; rule violations are not raised as errors here.
    ///
    /// # Errors
    /// Faults from `update` itself (contract violations such as a null
    /// element or an identity violation) roll the transaction back and then
    /// propagate. Opening a transaction while one is open is a
    /// `TransactionState` fault.
    fn track_changes(&mut self, update: impl FnOnce(&mut Self) -> Result<()>) -> Result<ValidationReport> {
        self.state_mut().tracker_mut().begin_buffering()?;
        match update(self) {
            Err(fault) => {
                // Rollback is unconditional on any non-success path.
                self.state_mut().resolve(false);
                Err(fault)
            }
            Ok(()) => {
                let report = self.validate();
                let valid = report.is_valid();
                self.state_mut().resolve(valid);
                Ok(report)
            }
        }
    }

    /// Borrow-scoped mutator over a child collection; see
    /// [`EntityState::collection`].
    fn collection(&mut self, name: &str) -> Result<ChildCollection<'_>> {
        self.state_mut().collection(name)
    }

    /// Identity equality: same runtime type, same identifier, neither
    /// transient. Two transients are never equal.
    fn same_identity(&self, other: &Self) -> bool {
        !self.is_transient() && !other.is_transient() && self.id() == other.id()
    }

    /// Hashable key for this entity.
    ///
    /// # Errors
    /// `TransientIdentity` while the identifier is still nil; a transient
    /// entity's identity is not stable enough to key on.
    fn key(&self) -> Result<EntityKey> {
        if self.is_transient() {
            return Err(DomainError::TransientIdentity(format!(
                "'{}' has no identifier yet and cannot be used as a key",
                self.state().store().schema().type_name()
            )));
        }
        Ok(EntityKey {
            type_id: TypeId::of::<Self>(),
            id: self.id(),
        })
    }
}
