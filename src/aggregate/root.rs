// ============================================================================
// Aggregate Root
// ============================================================================
//
// An aggregate root is an entity that additionally owns an event stream and
// can rebuild its state by replaying it. Event application is dispatched
// through the concrete type's `apply` match; dispatch, validation and
// append run as one uninterruptible sequence under the exclusive borrow.
//
// ============================================================================

use std::fmt;

use log::debug;

use crate::aggregate::{EventStream, RecordedEvent};
use crate::collections::ValueObjectCollection;
use crate::core::{DomainError, Result, Value};
use crate::entity::{Entity, EntityState};
use crate::validate::ValidationReport;

/// Entity state plus the owned event stream. Concrete aggregate types embed
/// one of these and expose it through [`AggregateRoot`].
#[derive(Debug)]
pub struct AggregateState<E> {
    entity: EntityState,
    stream: EventStream<E>,
}

impl<E> AggregateState<E> {
    /// State for a fresh, transient aggregate with an empty stream.
    pub fn transient<T: Entity>() -> Result<Self> {
        Ok(Self {
            entity: EntityState::transient::<T>()?,
            stream: EventStream::new(),
        })
    }

    pub fn entity(&self) -> &EntityState {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut EntityState {
        &mut self.entity
    }

    pub fn stream(&self) -> &EventStream<E> {
        &self.stream
    }

    pub(crate) fn stream_mut(&mut self) -> &mut EventStream<E> {
        &mut self.stream
    }
}

/// An [`Entity`] that owns an append-only event stream and reconstructs its
/// state from events.
///
/// The concrete type declares its event enum and a single `apply` match,
/// which acts as the dispatch table over event variants. Events never mutate
/// state outside a tracked transaction, so an invalid application rolls the
/// aggregate back and discards the event.
pub trait AggregateRoot: Entity {
    type Event: Clone + fmt::Debug;

    fn aggregate_state(&self) -> &AggregateState<Self::Event>;

    fn aggregate_state_mut(&mut self) -> &mut AggregateState<Self::Event>;

    /// Construct a fresh, transient instance. Used by
    /// [`from_event_stream`](AggregateRoot::from_event_stream) as the replay
    /// target.
    fn transient() -> Result<Self>;

    /// Apply one event to entity state. Runs inside an open transaction, so
    /// handlers mutate through `set_property`, `collection` and the
    /// membership helpers.
    ///
    /// # Errors
    /// Return [`DomainError::UnsupportedEvent`] for a variant this aggregate
    /// does not handle; the fault surfaces before any state mutation is
    /// kept.
    fn apply(&mut self, event: &Self::Event) -> Result<()>;

    fn stream(&self) -> &EventStream<Self::Event> {
        self.aggregate_state().stream()
    }

    /// Count of events admitted to the stream.
    fn version(&self) -> u64 {
        self.stream().version()
    }

    /// Events pending external persistence.
    fn uncommitted_events(&self) -> &[RecordedEvent<Self::Event>] {
        self.stream().uncommitted()
    }

    /// Read-only view over a value-object collection.
    fn value_objects(&self, name: &str) -> Result<ValueObjectCollection<'_>> {
        Ok(ValueObjectCollection::new(self.state().list(name)?))
    }

    /// Record a membership addition on a value-object collection. Only
    /// callable inside an open transaction, which keeps membership subject
    /// to the same validate/rollback envelope as scalar fields.
    fn record_added(&mut self, collection: &str, value: impl Into<Value>) -> Result<()> {
        self.state_mut()
            .record_membership_added(collection, value.into())
    }

    /// Record a membership removal; `Ok(false)` when no element matched.
    fn record_removed(&mut self, collection: &str, value: &Value) -> Result<bool> {
        self.state_mut().record_membership_removed(collection, value)
    }

    /// Apply a live event: dispatch through `apply`, validate the whole
    /// aggregate, and on success append the event to the uncommitted run and
    /// advance the version. An invalid event is rolled back, discarded
    /// without ever entering the stream, and the failing report is returned.
    ///
    /// The whole sequence runs under the exclusive `&mut` borrow; callers
    /// sharing an instance across threads serialize through
    /// [`Shared`](crate::aggregate::Shared).
    ///
    /// # Errors
    /// Dispatch faults (unsupported event, contract violations inside the
    /// handler) propagate after rollback. The handler must have assigned an
    /// identifier by the time the first event is recorded.
    fn apply_change(&mut self, event: Self::Event) -> Result<ValidationReport> {
        let report = self.track_changes(|aggregate| aggregate.apply(&event))?;
        if report.is_valid() {
            let id = self.id();
            let version = self.stream().version() + 1;
            self.aggregate_state_mut()
                .stream_mut()
                .add_uncommitted(RecordedEvent::new(id, version, event))?;
            debug!("event accepted at version {}", version);
        } else {
            debug!("event rejected: {}", report);
        }
        Ok(report)
    }

    /// Replay historical events in order through the same dispatch
    /// mechanism, as one buffered transaction. Ordering and ownership are
    /// checked against the stream before any dispatch runs; a bad batch
    /// leaves both the stream and the property state untouched. On success
    /// the batch lands in committed history and the version advances by the
    /// batch size.
    ///
    /// Produces property state identical to applying the same events one at
    /// a time on a fresh instance.
    ///
    /// # Errors
    /// `EventOrdering` on a non-successive or mixed-owner batch; dispatch
    /// faults propagate after rollback.
    fn load_from_history(
        &mut self,
        events: Vec<RecordedEvent<Self::Event>>,
    ) -> Result<ValidationReport> {
        self.aggregate_state().stream().check_succession(&events)?;
        let report = self.track_changes(|aggregate| {
            for event in &events {
                aggregate.apply(event.payload())?;
            }
            Ok(())
        })?;
        if report.is_valid() {
            let count = events.len();
            self.aggregate_state_mut().stream_mut().add_committed(events)?;
            debug!("replayed {} event(s)", count);
        }
        Ok(report)
    }

    /// Reconstruct an aggregate purely from its recorded history.
    ///
    /// # Errors
    /// An invalid replay surfaces as `DomainError::Validation` carrying the
    /// failing report; ordering and dispatch faults propagate as from
    /// [`load_from_history`](AggregateRoot::load_from_history).
    fn from_event_stream(events: Vec<RecordedEvent<Self::Event>>) -> Result<Self> {
        let mut aggregate = Self::transient()?;
        let report = aggregate.load_from_history(events)?;
        if report.is_valid() {
            Ok(aggregate)
        } else {
            Err(DomainError::Validation(report))
        }
    }

    /// Acknowledge external persistence of the uncommitted run, promoting it
    /// to committed history. Returns how many events were promoted.
    fn commit_events(&mut self) -> usize {
        self.aggregate_state_mut().stream_mut().commit_events()
    }
}
