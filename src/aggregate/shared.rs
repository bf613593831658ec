use std::sync::{Arc, Mutex};

use crate::aggregate::AggregateRoot;
use crate::core::Result;
use crate::validate::ValidationReport;

/// Cross-thread handle for one aggregate instance.
///
/// Within a single thread the exclusive `&mut` borrow already serializes
/// mutation; this wrapper carries the same guarantee across threads with a
/// per-instance mutex, so two concurrent `apply_change` calls never
/// interleave their dispatch, validation and append phases. Contention
/// resolves only by the first call returning; there is no timeout.
#[derive(Debug)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: AggregateRoot> Shared<T> {
    pub fn new(aggregate: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(aggregate)),
        }
    }

    /// Apply a live event under the instance lock.
    ///
    /// # Errors
    /// A poisoned lock maps to `DomainError::LockError`; everything else as
    /// [`AggregateRoot::apply_change`].
    pub fn apply_change(&self, event: T::Event) -> Result<ValidationReport> {
        let mut aggregate = self.inner.lock()?;
        aggregate.apply_change(event)
    }

    /// Run a buffered transaction under the instance lock.
    pub fn track_changes(
        &self,
        update: impl FnOnce(&mut T) -> Result<()>,
    ) -> Result<ValidationReport> {
        let mut aggregate = self.inner.lock()?;
        aggregate.track_changes(update)
    }

    pub fn version(&self) -> Result<u64> {
        Ok(self.inner.lock()?.version())
    }

    pub fn commit_events(&self) -> Result<usize> {
        Ok(self.inner.lock()?.commit_events())
    }

    /// Read access under the instance lock. Note that even read-mostly
    /// access is unsafe outside the lock while a transaction may be open.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> Result<R> {
        let aggregate = self.inner.lock()?;
        Ok(read(&aggregate))
    }

    /// Recover the aggregate when this is the last handle.
    pub fn try_unwrap(self) -> std::result::Result<T, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => match mutex.into_inner() {
                Ok(aggregate) => Ok(aggregate),
                Err(poisoned) => Ok(poisoned.into_inner()),
            },
            Err(inner) => Err(Self { inner }),
        }
    }
}
