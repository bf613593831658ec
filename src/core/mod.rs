pub mod error;
pub mod identity;
pub mod value;

pub use error::{DomainError, Result};
pub use identity::Identifier;
pub use value::{Value, ValueKind};
