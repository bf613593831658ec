//! Recommended API entrypoints grouped by abstraction level.
//!
//! `dx` is the stable default for domain-model-first applications.
//! `advanced` is an explicit escape hatch for engine internals.

pub mod dx {
    //! Stable high-level surface for declaring and mutating domain models.
    //!
    //! Intended usage in app code:
    //! - entity/aggregate trait impls plus schema declaration,
    //! - buffered transactions and event application,
    //! - reconstruction from recorded history.
    pub use crate::{
        AggregateRoot, AggregateState, DomainError, Entity, EntitySchema, EntityState,
        EventStream, Identifier, PropertyDef, RecordedEvent, Result, SchemaBuilder, Shared,
        Severity, ValidationMessage, ValidationReport, Value, ValueKind,
    };

    pub use crate::validate::rule;
}

pub mod advanced {
    //! Escape hatch for change-tracking internals.
    //!
    //! App-level product code should normally stay on `prelude::dx`.
    pub use crate::schema::{schema_of, CollectionKind, PropertyId, SlotDef};
    pub use crate::store::PropertyStore;
    pub use crate::tracker::{ChangeTracker, CompensatingAction, TrackingMode};
}
