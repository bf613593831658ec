// ============================================================================
// Compensating Actions
// ============================================================================
//
// Implements the Command Pattern for reversible entity mutations. Each
// action is created at the moment a mutation is applied and describes how to
// invert exactly that mutation. A transaction commits by discarding its
// actions and rolls back by replaying them in reverse chronological order.
//
// ============================================================================

use crate::core::{Identifier, Value};
use crate::schema::PropertyId;
use crate::store::PropertyStore;

/// A single reversible change recorded in the active transaction.
#[derive(Debug, Clone)]
pub enum CompensatingAction {
    /// Restore a scalar property to its prior value
    RestoreScalar { slot: PropertyId, prior: Value },

    /// Restore the entity identifier assigned during the transaction
    RestoreIdentity { prior: Identifier },

    /// Undo an indexer write on a collection
    UndoIndexSet {
        slot: PropertyId,
        index: usize,
        prior: Value,
    },

    /// Undo an insertion by removing the inserted element
    UndoInsert { slot: PropertyId, index: usize },

    /// Undo a removal by re-inserting the removed element
    UndoRemoveAt {
        slot: PropertyId,
        index: usize,
        removed: Value,
    },

    /// Undo a sort by restoring the prior order
    UndoSort {
        slot: PropertyId,
        prior: Vec<Value>,
    },

    /// Undo a clear by restoring the prior contents
    UndoClear {
        slot: PropertyId,
        prior: Vec<Value>,
    },
}

impl CompensatingAction {
    /// The slot this action targets; `None` for identity restoration.
    pub fn slot(&self) -> Option<PropertyId> {
        match self {
            CompensatingAction::RestoreScalar { slot, .. }
            | CompensatingAction::UndoIndexSet { slot, .. }
            | CompensatingAction::UndoInsert { slot, .. }
            | CompensatingAction::UndoRemoveAt { slot, .. }
            | CompensatingAction::UndoSort { slot, .. }
            | CompensatingAction::UndoClear { slot, .. } => Some(*slot),
            CompensatingAction::RestoreIdentity { .. } => None,
        }
    }

    /// Check if this action inverts a collection edit
    pub fn is_collection_edit(&self) -> bool {
        matches!(
            self,
            CompensatingAction::UndoIndexSet { .. }
                | CompensatingAction::UndoInsert { .. }
                | CompensatingAction::UndoRemoveAt { .. }
                | CompensatingAction::UndoSort { .. }
                | CompensatingAction::UndoClear { .. }
        )
    }

    /// Apply the inverse mutation. Indices recorded at mutation time are
    /// valid again by the time this runs because actions replay in reverse
    /// order.
    pub(crate) fn revert(self, id: &mut Identifier, store: &mut PropertyStore) {
        match self {
            CompensatingAction::RestoreScalar { slot, prior } => {
                store.restore_scalar(slot, prior);
            }
            CompensatingAction::RestoreIdentity { prior } => {
                *id = prior;
            }
            CompensatingAction::UndoIndexSet { slot, index, prior } => {
                store.list_mut(slot)[index] = prior;
            }
            CompensatingAction::UndoInsert { slot, index } => {
                store.list_mut(slot).remove(index);
            }
            CompensatingAction::UndoRemoveAt {
                slot,
                index,
                removed,
            } => {
                store.list_mut(slot).insert(index, removed);
            }
            CompensatingAction::UndoSort { slot, prior }
            | CompensatingAction::UndoClear { slot, prior } => {
                *store.list_mut(slot) = prior;
            }
        }
    }
}
