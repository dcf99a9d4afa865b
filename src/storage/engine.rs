use crate::core::{HistoryEntry, Result, StoredStatus};
use crate::transaction::WriteRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Selects history entries of one entity, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub env_uuid: String,
    pub entity_id: String,
    pub skip: usize,
    /// `None` returns every matching entry.
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn new(env_uuid: &str, entity_id: &str) -> Self {
        Self {
            env_uuid: env_uuid.to_string(),
            entity_id: entity_id.to_string(),
            skip: 0,
            limit: None,
        }
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        entry.env_uuid == self.env_uuid && entry.entity_id == self.entity_id
    }
}

/// A committed change to one status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub doc_id: String,
    /// Revision after the change; `None` when the document was removed.
    pub txn_revno: Option<u64>,
}

/// The transactional document store the status subsystem runs on.
///
/// Implementations must make `run` atomic (all preconditions are checked
/// and all ops applied without interleaving another write to the same
/// documents) and `next_sequence` safe under concurrent callers in any
/// number of processes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup of a status document by id.
    async fn find_status(&self, id: &str) -> Result<Option<StoredStatus>>;

    /// Current revision of a status document; `DbError::NotFound` if missing.
    async fn read_txn_revno(&self, id: &str) -> Result<u64>;

    /// Apply a conditional write request.
    ///
    /// Fails with `DbError::Aborted` if a document precondition does not
    /// hold and `DbError::Invalidated` if a guard no longer holds.
    async fn run(&self, request: WriteRequest) -> Result<()>;

    /// Allocate the next value of the named counter. Values are strictly
    /// increasing across all callers.
    async fn next_sequence(&self, name: &str) -> Result<i64>;

    /// Unconditionally insert a history entry.
    async fn insert_history(&self, entry: HistoryEntry) -> Result<()>;

    /// History entries matching `query`, sorted by descending id.
    async fn query_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>>;

    /// Delete the entity's history entries with id strictly below `below_id`.
    /// Returns the number removed.
    async fn remove_history(&self, env_uuid: &str, entity_id: &str, below_id: i64)
        -> Result<usize>;

    /// Distinct entity ids owning at least one history entry.
    async fn distinct_history_entities(&self, env_uuid: &str) -> Result<Vec<String>>;

    /// Subscribe to committed status document changes.
    fn watch_statuses(&self) -> broadcast::Receiver<StatusChange>;
}
