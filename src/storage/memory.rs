use super::engine::{DocumentStore, HistoryQuery, StatusChange};
use crate::core::{DbError, HistoryEntry, Result, StoredStatus};
use crate::transaction::{Op, Precondition, WriteRequest};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;
use tokio::sync::{Mutex, RwLock, broadcast};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Document store kept entirely in process memory.
///
/// All writes to the status collection go through one lock, so a write
/// request's preconditions and ops are evaluated without interleaving.
pub struct InMemoryStore {
    statuses: RwLock<HashMap<String, StoredStatus>>,
    /// History entries keyed by environment, then sequence id. Environments
    /// may draw ids from different counters.
    history: RwLock<BTreeMap<(String, i64), HistoryEntry>>,
    sequences: Mutex<HashMap<String, i64>>,
    changes: broadcast::Sender<StatusChange>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            statuses: RwLock::new(HashMap::new()),
            history: RwLock::new(BTreeMap::new()),
            sequences: Mutex::new(HashMap::new()),
            changes,
        }
    }

    /// Number of status documents, across all environments.
    pub async fn status_count(&self) -> usize {
        self.statuses.read().await.len()
    }

    /// Number of history entries, across all environments.
    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    fn check(statuses: &HashMap<String, StoredStatus>, precondition: &Precondition) -> Result<()> {
        match precondition {
            Precondition::DocMissing { id } => {
                if statuses.contains_key(id) {
                    return Err(DbError::Aborted(id.clone()));
                }
            }
            Precondition::RevnoEquals { id, txn_revno } => match statuses.get(id) {
                Some(stored) if stored.txn_revno == *txn_revno => {}
                _ => return Err(DbError::Aborted(id.clone())),
            },
            Precondition::Held(guard) => {
                if !guard.holds() {
                    return Err(DbError::Invalidated(guard.describe()));
                }
            }
        }
        Ok(())
    }

    fn apply(statuses: &mut HashMap<String, StoredStatus>, op: Op) -> Option<StatusChange> {
        match op {
            Op::Insert { id, doc } => {
                if statuses.contains_key(&id) {
                    return None;
                }
                statuses.insert(id.clone(), StoredStatus { doc, txn_revno: 1 });
                Some(StatusChange {
                    doc_id: id,
                    txn_revno: Some(1),
                })
            }
            Op::Update { id, doc } => {
                let stored = statuses.get_mut(&id)?;
                stored.doc = doc;
                stored.txn_revno += 1;
                Some(StatusChange {
                    txn_revno: Some(stored.txn_revno),
                    doc_id: id,
                })
            }
            Op::Remove { id } => statuses.remove(&id).map(|_| StatusChange {
                doc_id: id,
                txn_revno: None,
            }),
        }
    }
}

/// Key range covering every history entry of `env_uuid`.
fn env_range(env_uuid: &str) -> RangeInclusive<(String, i64)> {
    (env_uuid.to_string(), i64::MIN)..=(env_uuid.to_string(), i64::MAX)
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_status(&self, id: &str) -> Result<Option<StoredStatus>> {
        let statuses = self.statuses.read().await;
        Ok(statuses.get(id).cloned())
    }

    async fn read_txn_revno(&self, id: &str) -> Result<u64> {
        let statuses = self.statuses.read().await;
        statuses
            .get(id)
            .map(|stored| stored.txn_revno)
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    async fn run(&self, request: WriteRequest) -> Result<()> {
        let (preconditions, ops) = request.into_parts();

        let committed: Vec<StatusChange> = {
            let mut statuses = self.statuses.write().await;
            for precondition in &preconditions {
                Self::check(&statuses, precondition)?;
            }
            ops.into_iter()
                .filter_map(|op| Self::apply(&mut statuses, op))
                .collect()
        };

        for change in committed {
            // no subscribers is not an error
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    async fn next_sequence(&self, name: &str) -> Result<i64> {
        let mut sequences = self.sequences.lock().await;
        let counter = sequences.entry(name.to_string()).or_insert(0);
        let value = *counter;
        *counter += 1;
        Ok(value)
    }

    async fn insert_history(&self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.history.write().await;
        let key = (entry.env_uuid.clone(), entry.id);
        if history.contains_key(&key) {
            return Err(DbError::ExecutionError(format!(
                "duplicate history id {} in environment {}",
                entry.id, entry.env_uuid
            )));
        }
        history.insert(key, entry);
        Ok(())
    }

    async fn query_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>> {
        let history = self.history.read().await;
        let matching = history
            .range(env_range(&query.env_uuid))
            .rev()
            .map(|(_, entry)| entry)
            .filter(|entry| query.matches(entry))
            .skip(query.skip)
            .cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn remove_history(
        &self,
        env_uuid: &str,
        entity_id: &str,
        below_id: i64,
    ) -> Result<usize> {
        let mut history = self.history.write().await;
        let doomed: Vec<(String, i64)> = history
            .range(env_range(env_uuid))
            .filter(|((_, id), entry)| *id < below_id && entry.entity_id == entity_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            history.remove(key);
        }
        Ok(doomed.len())
    }

    async fn distinct_history_entities(&self, env_uuid: &str) -> Result<Vec<String>> {
        let history = self.history.read().await;
        let entities: BTreeSet<&str> = history
            .range(env_range(env_uuid))
            .map(|(_, entry)| entry.entity_id.as_str())
            .collect();
        Ok(entities.into_iter().map(str::to_string).collect())
    }

    fn watch_statuses(&self) -> broadcast::Receiver<StatusChange> {
        self.changes.subscribe()
    }
}
