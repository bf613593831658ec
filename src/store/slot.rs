use crate::core::Value;
use crate::schema::CollectionKind;

/// Scalar slot: the live value plus the value recorded at the last
/// successful commit.
#[derive(Debug, Clone)]
pub(crate) struct ScalarSlot {
    pub current: Value,
    pub committed: Value,
}

impl ScalarSlot {
    pub fn is_dirty(&self) -> bool {
        self.current != self.committed
    }
}

/// Backing storage for a tracked collection.
#[derive(Debug, Clone)]
pub(crate) struct ListSlot {
    pub kind: CollectionKind,
    pub items: Vec<Value>,
    pub committed: Vec<Value>,
}

impl ListSlot {
    pub fn is_dirty(&self) -> bool {
        self.items != self.committed
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Scalar(ScalarSlot),
    List(ListSlot),
}
