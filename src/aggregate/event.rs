use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Identifier;

/// A domain event admitted to an aggregate's stream: the payload wrapped
/// with the owning aggregate's identifier, its positional version and the
/// wall-clock time it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent<E> {
    aggregate_id: Identifier,
    version: u64,
    recorded_at: DateTime<Utc>,
    payload: E,
}

impl<E> RecordedEvent<E> {
    pub fn new(aggregate_id: Identifier, version: u64, payload: E) -> Self {
        Self {
            aggregate_id,
            version,
            recorded_at: Utc::now(),
            payload,
        }
    }

    /// Rebuild an envelope as read back from external storage.
    pub fn restored(
        aggregate_id: Identifier,
        version: u64,
        recorded_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            aggregate_id,
            version,
            recorded_at,
            payload,
        }
    }

    pub fn aggregate_id(&self) -> Identifier {
        self.aggregate_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
