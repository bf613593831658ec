pub mod entity;

pub use entity::{Entity, EntityKey, EntityState};
