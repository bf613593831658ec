use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use log::debug;

use crate::core::Result;
use crate::entity::Entity;
use crate::schema::EntitySchema;

// Process-wide schema cache, keyed by type identity. Built once per concrete
// entity type on first use and shared by all instances.
lazy_static! {
    static ref SCHEMAS: RwLock<HashMap<TypeId, Arc<EntitySchema>>> = RwLock::new(HashMap::new());
}

/// Resolve (building and memoizing on first use) the schema for `T`.
///
/// # Errors
/// A malformed schema (duplicate or empty property name) fails here on every
/// use of the type; nothing is cached in that case.
pub fn schema_of<T: Entity>() -> Result<Arc<EntitySchema>> {
    let key = TypeId::of::<T>();

    if let Some(schema) = SCHEMAS.read()?.get(&key) {
        return Ok(schema.clone());
    }

    let schema = Arc::new(T::define_schema().build()?);
    debug!(
        "registered schema for '{}' ({} slot(s))",
        schema.type_name(),
        schema.slots().len()
    );

    let mut cache = SCHEMAS.write()?;
    // A concurrent first use may have won the race; keep the first entry.
    Ok(cache.entry(key).or_insert(schema).clone())
}
