use crate::core::{
    DbError, HistoryEntry, StatusDoc, StatusError, StatusInfo, StatusResult, unescape_keys,
};
use crate::storage::{DocumentStore, HistoryQuery};
use std::sync::Arc;
use tracing::error;

const HISTORY_CONTEXT: &str = "cannot get status history";

/// Records and reads the status history of the entities of one environment.
#[derive(Clone)]
pub struct StatusHistory {
    store: Arc<dyn DocumentStore>,
    env_uuid: String,
    sequence: String,
}

impl StatusHistory {
    pub fn new(store: Arc<dyn DocumentStore>, env_uuid: &str, sequence: &str) -> Self {
        Self {
            store,
            env_uuid: env_uuid.to_string(),
            sequence: sequence.to_string(),
        }
    }

    /// Appends a snapshot of `doc` to the history of `global_key`.
    ///
    /// Best effort: failures are logged and never reach the caller, whose
    /// primary write proceeds regardless.
    pub async fn record(&self, global_key: &str, doc: &StatusDoc) {
        let id = match self.store.next_sequence(&self.sequence).await {
            Ok(id) => id,
            Err(err) => {
                error!(global_key, error = %err, "failed to generate id for status history");
                return;
            }
        };

        let entry = HistoryEntry {
            id,
            // set explicitly; the doc may predate its environment being filled in
            env_uuid: self.env_uuid.clone(),
            entity_id: global_key.to_string(),
            status: doc.status,
            status_info: doc.status_info.clone(),
            status_data: doc.status_data.clone(),
            updated: doc.updated,
        };

        if let Err(err) = self.store.insert_history(entry).await {
            error!(global_key, history_id = id, error = %err, "failed to write status history");
        }
    }

    /// Up to `size` most recent statuses of `global_key`, newest first.
    /// A `size` of zero returns the whole history.
    ///
    /// An entity without history yields an empty list; `NotFound` is
    /// reserved for the store reporting the query itself as not found.
    pub async fn history(&self, global_key: &str, size: usize) -> StatusResult<Vec<StatusInfo>> {
        let mut query = HistoryQuery::new(&self.env_uuid, global_key);
        if size > 0 {
            query = query.limit(size);
        }

        let entries = match self.store.query_history(&query).await {
            Ok(entries) => entries,
            Err(DbError::NotFound(_)) => {
                return Err(StatusError::NotFound {
                    context: HISTORY_CONTEXT,
                    badge: "status history".to_string(),
                });
            }
            Err(source) => {
                return Err(StatusError::Store {
                    context: HISTORY_CONTEXT,
                    source,
                });
            }
        };

        Ok(entries
            .iter()
            .map(|entry| {
                let mut info = entry.to_info();
                info.data = unescape_keys(&entry.status_data);
                info
            })
            .collect())
    }
}
