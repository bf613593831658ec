//! In-memory mutation engine for domain entities and aggregates.
//!
//! Entities declare a schema (defaults plus validation rules) and mutate
//! exclusively through a per-instance change tracker: one or many scalar and
//! collection writes form a buffered transaction that is validated as a
//! whole and either kept or rolled back in full. Aggregate roots extend
//! entities with an append-only, versioned event stream and can rebuild
//! their state deterministically by replaying it.
//!
//! # Examples
//!
//! ```
//! use aggroot::validate::rule;
//! use aggroot::{Entity, EntitySchema, EntityState, PropertyDef, SchemaBuilder};
//!
//! struct Person {
//!     state: EntityState,
//! }
//!
//! impl Person {
//!     fn new() -> aggroot::Result<Self> {
//!         Ok(Self {
//!             state: EntityState::transient::<Self>()?,
//!         })
//!     }
//! }
//!
//! impl Entity for Person {
//!     fn define_schema() -> SchemaBuilder {
//!         EntitySchema::define("Person")
//!             .property(PropertyDef::new("name", "").required())
//!             .property(PropertyDef::new("age", 0i64).rule(rule::min_integer(18)))
//!     }
//!
//!     fn state(&self) -> &EntityState {
//!         &self.state
//!     }
//!
//!     fn state_mut(&mut self) -> &mut EntityState {
//!         &mut self.state
//!     }
//! }
//!
//! # fn main() -> aggroot::Result<()> {
//! let mut person = Person::new()?;
//!
//! let report = person.track_changes(|p| {
//!     p.set_property("name", "Ada")?;
//!     p.set_property("age", 36i64)
//! })?;
//! assert!(report.is_valid());
//!
//! // An invalid transaction rolls every write back
//! let report = person.track_changes(|p| {
//!     p.set_property("name", "Grace")?;
//!     p.set_property("age", 5i64)
//! })?;
//! assert!(!report.is_valid());
//! assert_eq!(person.get("name")?.as_str(), Some("Ada"));
//! assert_eq!(person.get("age")?.as_i64(), Some(36));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod collections;
pub mod core;
pub mod entity;
pub mod prelude;
pub mod schema;
pub mod store;
pub mod tracker;
pub mod validate;

// Re-export main types for convenience
pub use crate::core::{DomainError, Identifier, Result, Value, ValueKind};
pub use crate::aggregate::{AggregateRoot, AggregateState, EventStream, RecordedEvent, Shared};
pub use crate::collections::{ChildCollection, ValueObjectCollection};
pub use crate::entity::{Entity, EntityKey, EntityState};
pub use crate::schema::{EntitySchema, PropertyDef, PropertyId, SchemaBuilder};
pub use crate::store::PropertyStore;
pub use crate::tracker::{ChangeTracker, CompensatingAction, TrackingMode};
pub use crate::validate::{Severity, ValidationMessage, ValidationReport};
