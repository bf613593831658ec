pub mod property;
pub mod registry;

pub use property::{
    CollectionDef, CollectionKind, EntitySchema, PropertyDef, PropertyId, SchemaBuilder, SlotDef,
};
pub use registry::schema_of;
