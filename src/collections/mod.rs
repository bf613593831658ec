pub mod child;
pub mod value_objects;

pub use child::ChildCollection;
pub use value_objects::ValueObjectCollection;
