use crate::auditor::AuditError;
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-call context for [`crate::auditor::Auditor::check`].
///
/// Clones share the same cancellation flag, so a caller can keep one clone and cancel a check running elsewhere. The
/// flag is polled between actions, never in the middle of a single commitment check.
#[derive(Clone, Debug, Default)]
pub struct CheckContext {
    cancelled: Arc<AtomicBool>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_active(&self, tx_id: &str) -> Result<(), AuditError> {
        if self.is_cancelled() {
            warn!("Audit of tx [{tx_id}] was cancelled");
            return Err(AuditError::Cancelled(tx_id.to_string()));
        }
        Ok(())
    }
}
