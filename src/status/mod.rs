// ============================================================================
// Entity Status
// ============================================================================
//
// Current status documents, their history, and history retention.
//
// Write path of `StatusStore::set`:
//   1. timestamp (whole seconds) and build the escaped document
//   2. record history, best effort, before the authoritative write
//   3. read the document revision and build the guarded update
//   4. compose the leadership token check, if any
//   5. run; a missing document or a moved revision is NotFound
//
// ============================================================================

pub mod guard;
pub mod history;
pub mod params;
pub mod prune;
pub mod store;
pub mod watch;

pub use history::StatusHistory;
pub use params::SetStatusParams;
pub use prune::{HistoryPruner, PruneReport, PrunerHandle};
pub use store::{PreparedStatus, StatusStore};
pub use watch::StatusWatcher;
