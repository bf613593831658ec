// ============================================================================
// Change Tracker
// ============================================================================
//
// Per-instance transaction bookkeeping: the current tracking mode plus the
// open transaction's compensating-action log. The tracker never touches the
// property store itself; the owning entity state drives commit and rollback
// so that identity and storage stay under one `&mut` borrow.
//
// ============================================================================

use crate::core::{DomainError, Result};
use crate::tracker::{CompensatingAction, TrackingMode};

#[derive(Debug)]
pub struct ChangeTracker {
    mode: TrackingMode,
    log: Vec<CompensatingAction>,
    initialized: bool,
}

impl ChangeTracker {
    pub(crate) fn new() -> Self {
        Self {
            mode: TrackingMode::Armed,
            log: Vec::new(),
            initialized: false,
        }
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Number of compensating actions pending in the open transaction
    pub fn pending_actions(&self) -> usize {
        self.log.len()
    }

    pub(crate) fn record(&mut self, action: CompensatingAction) {
        self.log.push(action);
    }

    pub(crate) fn log_mut(&mut self) -> &mut Vec<CompensatingAction> {
        &mut self.log
    }

    /// Enter initialization mode. Usable exactly once, during construction.
    ///
    /// # Errors
    /// Fails if initialization already ran or a transaction is open.
    pub(crate) fn begin_initializing(&mut self) -> Result<()> {
        if self.initialized {
            return Err(DomainError::TransactionState(
                "initialization has already run for this instance".to_string(),
            ));
        }
        if self.mode != TrackingMode::Armed {
            return Err(DomainError::TransactionState(format!(
                "cannot initialize while tracker is {}",
                self.mode
            )));
        }
        self.mode = TrackingMode::Initializing;
        Ok(())
    }

    pub(crate) fn finish_initializing(&mut self) {
        self.initialized = true;
        self.mode = TrackingMode::Armed;
    }

    /// Open a buffered transaction.
    ///
    /// # Errors
    /// Fails if a transaction is already open; nesting is a precondition
    /// violation, not a supported feature.
    pub(crate) fn begin_buffering(&mut self) -> Result<()> {
        if self.mode != TrackingMode::Armed {
            return Err(DomainError::TransactionState(format!(
                "cannot open a transaction while tracker is {}",
                self.mode
            )));
        }
        self.mode = TrackingMode::Buffering;
        Ok(())
    }

    /// Hand over the open transaction's log and re-arm the tracker. The log
    /// is consumed at most once; a second call observes an empty log.
    pub(crate) fn take_log(&mut self) -> Vec<CompensatingAction> {
        self.mode = TrackingMode::Armed;
        std::mem::take(&mut self.log)
    }
}
