use crate::config::StatusConfig;
use crate::core::{DbError, StatusDoc, StatusError, StatusInfo, StatusResult};
use crate::status::{
    HistoryPruner, PruneReport, PrunerHandle, SetStatusParams, StatusHistory, StatusStore,
    StatusWatcher,
};
use crate::storage::{DocumentStore, InMemoryStore};
use crate::transaction::WriteRequest;
use std::sync::Arc;

/// Entry point to the status subsystem of one environment.
///
/// # Examples
///
/// ```
/// use statusdb::{State, StatusConfig, SetStatusParams, Status, StatusDoc};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let state = State::open(StatusConfig::new("env-1"))?;
///
/// let create = state
///     .insert_status_op("u#mysql/0", StatusDoc::new(Status::Pending, ""))
///     .await;
/// state.run_transaction(create).await?;
///
/// state
///     .set_status(SetStatusParams::new("u#mysql/0", "unit", Status::Active).message("ready"))
///     .await?;
///
/// let status = state.get_status("u#mysql/0", "unit").await?;
/// assert_eq!(status.message, "ready");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct State {
    config: StatusConfig,
    store: Arc<dyn DocumentStore>,
    statuses: StatusStore,
    history: StatusHistory,
    pruner: Arc<HistoryPruner>,
}

impl State {
    /// Open a state backed by a fresh in-memory store.
    pub fn open(config: StatusConfig) -> StatusResult<Self> {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    /// Open a state over an existing store. Several states, one per
    /// environment, may share a store.
    pub fn with_store(config: StatusConfig, store: Arc<dyn DocumentStore>) -> StatusResult<Self> {
        config.validate()?;

        let env_uuid = config.environment_uuid.as_str();
        let history = StatusHistory::new(Arc::clone(&store), env_uuid, &config.history_sequence);
        let statuses = StatusStore::new(Arc::clone(&store), env_uuid, history.clone());
        let pruner = Arc::new(HistoryPruner::new(Arc::clone(&store), env_uuid));

        Ok(Self {
            config,
            store,
            statuses,
            history,
            pruner,
        })
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Lower level access for callers that prepare and commit status
    /// writes separately.
    pub fn statuses(&self) -> &StatusStore {
        &self.statuses
    }

    pub async fn get_status(&self, global_key: &str, badge: &str) -> StatusResult<StatusInfo> {
        self.statuses.get(global_key, badge).await
    }

    pub async fn get_status_doc(&self, global_key: &str, badge: &str) -> StatusResult<StatusDoc> {
        self.statuses.get_doc(global_key, badge).await
    }

    pub async fn set_status(&self, params: SetStatusParams) -> StatusResult<()> {
        self.statuses.set(params).await
    }

    /// Up to `size` most recent statuses, newest first; zero means all.
    pub async fn status_history(
        &self,
        global_key: &str,
        size: usize,
    ) -> StatusResult<Vec<StatusInfo>> {
        self.history.history(global_key, size).await
    }

    /// History page of the configured default size.
    pub async fn recent_status_history(&self, global_key: &str) -> StatusResult<Vec<StatusInfo>> {
        self.history
            .history(global_key, self.config.default_history_size)
            .await
    }

    pub async fn prune_status_history(&self, max_per_entity: usize) -> StatusResult<PruneReport> {
        self.pruner.prune(max_per_entity).await
    }

    /// Start pruning in the background with the configured interval and
    /// retention.
    pub fn start_history_pruner(&self) -> PrunerHandle {
        Arc::clone(&self.pruner).spawn(
            self.config.prune_interval,
            self.config.max_history_per_entity,
        )
    }

    /// See [`StatusStore::create_insert_op`].
    pub async fn insert_status_op(&self, global_key: &str, doc: StatusDoc) -> WriteRequest {
        self.statuses.create_insert_op(global_key, doc).await
    }

    pub fn remove_status_op(&self, global_key: &str) -> WriteRequest {
        self.statuses.create_remove_op(global_key)
    }

    /// Run a write request assembled by the caller, typically entity
    /// creation or removal combining status ops with its own.
    pub async fn run_transaction(&self, request: WriteRequest) -> StatusResult<()> {
        const CONTEXT: &str = "cannot run transaction";
        self.store.run(request).await.map_err(|err| match err {
            DbError::Invalidated(reason) => StatusError::Invalidated {
                context: CONTEXT,
                reason,
            },
            source => StatusError::Store {
                context: CONTEXT,
                source,
            },
        })
    }

    /// Watch the status document of `global_key`.
    pub fn watch_status(&self, global_key: &str) -> StatusWatcher {
        StatusWatcher::new(self.statuses.doc_id(global_key), self.store.watch_statuses())
    }
}
