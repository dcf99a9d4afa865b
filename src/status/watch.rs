use crate::storage::StatusChange;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// Notifies of committed changes to one entity's status document.
pub struct StatusWatcher {
    doc_id: String,
    changes: broadcast::Receiver<StatusChange>,
}

impl StatusWatcher {
    pub(crate) fn new(doc_id: String, changes: broadcast::Receiver<StatusChange>) -> Self {
        Self { doc_id, changes }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Waits for the next change to the watched document. Returns `None`
    /// once the store stops publishing changes.
    ///
    /// A watcher that falls behind skips the notifications it missed;
    /// re-read the status rather than relying on every change arriving.
    pub async fn next(&mut self) -> Option<StatusChange> {
        loop {
            match self.changes.recv().await {
                Ok(change) if change.doc_id == self.doc_id => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(doc_id = %self.doc_id, skipped, "status watcher lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
