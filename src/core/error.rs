use thiserror::Error;

use crate::validate::ValidationReport;

#[derive(Error, Debug)]
pub enum DomainError {
    /// One or more rule violations on commit. The only recoverable kind:
    /// the transaction has already been rolled back when this surfaces.
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Identity violation: {0}")]
    IdentityViolation(String),

    #[error("Event ordering violation: {0}")]
    EventOrdering(String),

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    #[error("Transient identity: {0}")]
    TransientIdentity(String),

    #[error("Null element: {0}")]
    NullElement(String),

    #[error("Property '{0}' not found on '{1}'")]
    UnknownProperty(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Index {0} out of bounds for collection '{1}'")]
    OutOfBounds(usize, String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Transaction state error: {0}")]
    TransactionState(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

impl<T> From<std::sync::PoisonError<T>> for DomainError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
