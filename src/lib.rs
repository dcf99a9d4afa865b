// ============================================================================
// StatusDB Library
// ============================================================================
//
// Current status and bounded status history for the entities of a managed
// environment, on top of a transactional document store.
//
// ============================================================================

pub mod config;
pub mod core;
pub mod facade;
pub mod leadership;
pub mod prelude;
pub mod status;
pub mod storage;
pub mod transaction;

// Re-export main types for convenience
pub use config::StatusConfig;
pub use core::{
    DbError, GlobalKey, HistoryEntry, Status, StatusData, StatusDoc, StatusError, StatusInfo,
    StatusResult, Value,
};
pub use facade::State;
pub use leadership::{Lease, Token, TokenError};
pub use status::{PruneReport, SetStatusParams, StatusWatcher};
pub use storage::{DocumentStore, InMemoryStore, StatusChange};
pub use transaction::{Op, Precondition, WriteRequest};
