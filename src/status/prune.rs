// ============================================================================
// Status History Pruning
// ============================================================================
//
// Keeps the newest N history entries of every entity. "Newest" is by
// history id, and ids come from one counter shared by all entities, so the
// span of time retained differs from entity to entity depending on how
// often the others were written. Deletion itself is always scoped to one
// entity.
//
// ============================================================================

use crate::core::{DbError, StatusError, StatusResult};
use crate::storage::{DocumentStore, HistoryQuery};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

const PRUNE_CONTEXT: &str = "cannot prune status history";

/// Outcome of one pruning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Entities with history when the run started
    pub entities: usize,
    /// Entities that lost at least one entry
    pub pruned_entities: usize,
    pub removed: usize,
}

pub struct HistoryPruner {
    store: Arc<dyn DocumentStore>,
    env_uuid: String,
}

impl HistoryPruner {
    pub fn new(store: Arc<dyn DocumentStore>, env_uuid: &str) -> Self {
        Self {
            store,
            env_uuid: env_uuid.to_string(),
        }
    }

    /// Removes history entries until only the `max_per_entity` newest remain
    /// for each entity. The first store failure ends the run.
    pub async fn prune(&self, max_per_entity: usize) -> StatusResult<PruneReport> {
        if max_per_entity == 0 {
            return Err(StatusError::InvalidArgument(
                "max history entries per entity must be > 0".to_string(),
            ));
        }

        let entities = self
            .store
            .distinct_history_entities(&self.env_uuid)
            .await
            .map_err(store_error)?;

        let mut report = PruneReport {
            entities: entities.len(),
            ..PruneReport::default()
        };

        for global_key in &entities {
            let Some(keep_from) = self.oldest_id_to_keep(global_key, max_per_entity).await? else {
                continue;
            };

            let removed = self
                .store
                .remove_history(&self.env_uuid, global_key, keep_from)
                .await
                .map_err(store_error)?;

            if removed > 0 {
                debug!(global_key = %global_key, removed, keep_from, "pruned status history");
                report.pruned_entities += 1;
                report.removed += removed;
            }
        }

        info!(
            entities = report.entities,
            pruned_entities = report.pruned_entities,
            removed = report.removed,
            "status history pruning finished"
        );
        Ok(report)
    }

    /// Id of the `size`-th newest entry of `global_key`, or `None` when the
    /// entity has fewer entries than that.
    async fn oldest_id_to_keep(&self, global_key: &str, size: usize) -> StatusResult<Option<i64>> {
        let query = HistoryQuery::new(&self.env_uuid, global_key)
            .skip(size - 1)
            .limit(1);
        match self.store.query_history(&query).await {
            Ok(entries) => Ok(entries.first().map(|entry| entry.id)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(err) => Err(store_error(err)),
        }
    }

    /// Runs [`prune`](Self::prune) every `interval`, starting immediately,
    /// until the returned handle is stopped. A failed run is logged and the
    /// next one proceeds on schedule.
    pub fn spawn(self: Arc<Self>, interval: Duration, max_per_entity: usize) -> PrunerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (report_tx, report_rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => match self.prune(max_per_entity).await {
                        Ok(report) => {
                            let _ = report_tx.send(Some(report));
                        }
                        Err(err) => error!(error = %err, "status history pruning failed"),
                    },
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        PrunerHandle {
            stop: stop_tx,
            reports: report_rx,
            task,
        }
    }
}

fn store_error(source: DbError) -> StatusError {
    StatusError::Store {
        context: PRUNE_CONTEXT,
        source,
    }
}

/// Controls a pruner started with [`HistoryPruner::spawn`].
pub struct PrunerHandle {
    stop: watch::Sender<bool>,
    reports: watch::Receiver<Option<PruneReport>>,
    task: JoinHandle<()>,
}

impl PrunerHandle {
    /// Report of the most recent successful run, if any.
    pub fn last_report(&self) -> Option<PruneReport> {
        *self.reports.borrow()
    }

    /// Waits for the next successful run to finish.
    pub async fn next_report(&mut self) -> Option<PruneReport> {
        self.reports.changed().await.ok()?;
        *self.reports.borrow_and_update()
    }

    /// Stops the pruner and waits for its task to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}
