use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque entity identifier.
///
/// The nil value marks an entity as transient; once a non-nil identifier is
/// assigned it can never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(Uuid);

impl Identifier {
    /// Generate a new unique identifier
    pub fn new() -> Self {
        Identifier(Uuid::new_v4())
    }

    /// The default, unset identifier
    pub const fn nil() -> Self {
        Identifier(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Uuid> for Identifier {
    fn from(id: Uuid) -> Self {
        Identifier(id)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
