use serde::{Deserialize, Serialize};

use crate::aggregate::RecordedEvent;
use crate::core::{DomainError, Identifier, Result};

/// Append-only, ordered, versioned event log belonging to exactly one
/// aggregate instance.
///
/// Invariants: every event in both sequences carries the stream's aggregate
/// identifier; committed positional versions are contiguous starting at 1;
/// uncommitted versions continue the committed run; the stream's version
/// counts every admitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStream<E> {
    aggregate_id: Identifier,
    committed: Vec<RecordedEvent<E>>,
    uncommitted: Vec<RecordedEvent<E>>,
}

impl<E> EventStream<E> {
    pub fn new() -> Self {
        Self {
            aggregate_id: Identifier::nil(),
            committed: Vec::new(),
            uncommitted: Vec::new(),
        }
    }

    /// The owning aggregate's identifier; nil until the first event arrives.
    pub fn aggregate_id(&self) -> Identifier {
        self.aggregate_id
    }

    pub fn version(&self) -> u64 {
        (self.committed.len() + self.uncommitted.len()) as u64
    }

    pub fn committed(&self) -> &[RecordedEvent<E>] {
        &self.committed
    }

    /// Events produced since the last [`commit_events`](Self::commit_events),
    /// in order, for the caller to persist externally.
    pub fn uncommitted(&self) -> &[RecordedEvent<E>] {
        &self.uncommitted
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.uncommitted.is_empty()
    }

    /// Append a freshly produced event.
    ///
    /// # Errors
    /// `EventOrdering` when the event carries a nil or foreign aggregate
    /// identifier, or a version other than `version() + 1`. The stream is
    /// left unmutated.
    pub fn add_uncommitted(&mut self, event: RecordedEvent<E>) -> Result<()> {
        if event.aggregate_id().is_nil() {
            return Err(DomainError::EventOrdering(
                "event carries a nil aggregate identifier".to_string(),
            ));
        }
        if !self.aggregate_id.is_nil() && event.aggregate_id() != self.aggregate_id {
            return Err(DomainError::EventOrdering(format!(
                "event belongs to aggregate {} but the stream belongs to {}",
                event.aggregate_id(),
                self.aggregate_id
            )));
        }
        let expected = self.version() + 1;
        if event.version() != expected {
            return Err(DomainError::EventOrdering(format!(
                "expected version {}, got {}",
                expected,
                event.version()
            )));
        }
        if self.aggregate_id.is_nil() {
            self.aggregate_id = event.aggregate_id();
        }
        self.uncommitted.push(event);
        Ok(())
    }

    /// Validate a historical batch against the stream without mutating it:
    /// one non-nil aggregate identifier shared by every event and matching
    /// the stream's, and versions strictly successive from `version() + 1`.
    ///
    /// # Errors
    /// `EventOrdering` on any violation, including pending uncommitted
    /// events (a replay target must not have unpersisted history).
    pub fn check_succession(&self, events: &[RecordedEvent<E>]) -> Result<()> {
        let Some(first) = events.first() else {
            return Ok(());
        };
        if !self.uncommitted.is_empty() {
            return Err(DomainError::EventOrdering(
                "cannot append committed events while uncommitted events are pending".to_string(),
            ));
        }
        let id = first.aggregate_id();
        if id.is_nil() {
            return Err(DomainError::EventOrdering(
                "event carries a nil aggregate identifier".to_string(),
            ));
        }
        if !self.aggregate_id.is_nil() && id != self.aggregate_id {
            return Err(DomainError::EventOrdering(format!(
                "batch belongs to aggregate {} but the stream belongs to {}",
                id, self.aggregate_id
            )));
        }
        let mut expected = self.version() + 1;
        for event in events {
            if event.aggregate_id() != id {
                return Err(DomainError::EventOrdering(format!(
                    "batch mixes aggregates {} and {}",
                    id,
                    event.aggregate_id()
                )));
            }
            if event.version() != expected {
                return Err(DomainError::EventOrdering(format!(
                    "expected version {}, got {}",
                    expected,
                    event.version()
                )));
            }
            expected += 1;
        }
        Ok(())
    }

    /// Append a batch of historical events as already-committed history.
    /// Validation happens before anything mutates; a failing batch leaves
    /// the stream untouched.
    pub fn add_committed(&mut self, events: Vec<RecordedEvent<E>>) -> Result<()> {
        self.check_succession(&events)?;
        if let Some(first) = events.first() {
            if self.aggregate_id.is_nil() {
                self.aggregate_id = first.aggregate_id();
            }
        }
        self.committed.extend(events);
        Ok(())
    }

    /// Move the uncommitted run into committed history once the caller has
    /// persisted it externally. Versions are already contiguous by
    /// construction. Returns how many events were promoted.
    pub fn commit_events(&mut self) -> usize {
        let promoted = self.uncommitted.len();
        self.committed.append(&mut self.uncommitted);
        promoted
    }
}

impl<E> Default for EventStream<E> {
    fn default() -> Self {
        Self::new()
    }
}
