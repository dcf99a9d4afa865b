#![allow(dead_code)]

use async_trait::async_trait;
use statusdb::core::Result;
use statusdb::storage::{DocumentStore, HistoryQuery, InMemoryStore, StatusChange};
use statusdb::{DbError, HistoryEntry, State, StatusConfig, StatusDoc, Status, WriteRequest};
use statusdb::core::StoredStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::broadcast;

/// Which store calls should fail, and how.
#[derive(Default)]
pub struct Faults {
    pub sequence: AtomicBool,
    pub insert_history: AtomicBool,
    pub query_history_not_found: AtomicBool,
    pub query_history_broken: AtomicBool,
    pub remove_history: AtomicBool,
    pub distinct: AtomicBool,
    pub remove_history_calls: AtomicUsize,
}

/// An in-memory store that fails on demand.
pub struct FaultyStore {
    pub inner: InMemoryStore,
    pub faults: Faults,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            faults: Faults::default(),
        }
    }

    fn broken(what: &str) -> DbError {
        DbError::ExecutionError(format!("{} unavailable", what))
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn find_status(&self, id: &str) -> Result<Option<StoredStatus>> {
        self.inner.find_status(id).await
    }

    async fn read_txn_revno(&self, id: &str) -> Result<u64> {
        self.inner.read_txn_revno(id).await
    }

    async fn run(&self, request: WriteRequest) -> Result<()> {
        self.inner.run(request).await
    }

    async fn next_sequence(&self, name: &str) -> Result<i64> {
        if self.faults.sequence.load(Ordering::SeqCst) {
            return Err(Self::broken("sequence"));
        }
        self.inner.next_sequence(name).await
    }

    async fn insert_history(&self, entry: HistoryEntry) -> Result<()> {
        if self.faults.insert_history.load(Ordering::SeqCst) {
            return Err(Self::broken("history"));
        }
        self.inner.insert_history(entry).await
    }

    async fn query_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>> {
        if self.faults.query_history_not_found.load(Ordering::SeqCst) {
            return Err(DbError::NotFound("statuseshistory".to_string()));
        }
        if self.faults.query_history_broken.load(Ordering::SeqCst) {
            return Err(Self::broken("history"));
        }
        self.inner.query_history(query).await
    }

    async fn remove_history(
        &self,
        env_uuid: &str,
        entity_id: &str,
        below_id: i64,
    ) -> Result<usize> {
        self.faults.remove_history_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.remove_history.load(Ordering::SeqCst) {
            return Err(Self::broken("history"));
        }
        self.inner.remove_history(env_uuid, entity_id, below_id).await
    }

    async fn distinct_history_entities(&self, env_uuid: &str) -> Result<Vec<String>> {
        if self.faults.distinct.load(Ordering::SeqCst) {
            return Err(Self::broken("history"));
        }
        self.inner.distinct_history_entities(env_uuid).await
    }

    fn watch_statuses(&self) -> broadcast::Receiver<StatusChange> {
        self.inner.watch_statuses()
    }
}

pub fn new_state() -> State {
    State::open(StatusConfig::new("env-test")).unwrap()
}

pub fn faulty_state() -> (State, Arc<FaultyStore>) {
    let store = Arc::new(FaultyStore::new());
    let state = State::with_store(StatusConfig::new("env-test"), store.clone()).unwrap();
    (state, store)
}

/// Create the status document of `key`, as entity creation would.
pub async fn create_entity(state: &State, key: &str) {
    let op = state
        .insert_status_op(key, StatusDoc::new(Status::Pending, "waiting for machine"))
        .await;
    state.run_transaction(op).await.unwrap();
}
