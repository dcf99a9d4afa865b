use super::guard::{update_status_request, with_token};
use super::history::StatusHistory;
use super::params::SetStatusParams;
use crate::core::{
    StatusDoc, StatusError, StatusInfo, StatusResult, escape_keys, now_to_the_second,
    unescape_keys,
};
use crate::storage::DocumentStore;
use crate::transaction::{Op, Precondition, WriteRequest};
use std::sync::Arc;

const GET_CONTEXT: &str = "cannot get status";
const SET_CONTEXT: &str = "cannot set status";

/// A status write with its history recorded and its conditional update
/// built, ready to commit.
#[derive(Debug)]
pub struct PreparedStatus {
    badge: String,
    global_key: String,
    request: WriteRequest,
}

impl PreparedStatus {
    pub fn global_key(&self) -> &str {
        &self.global_key
    }

    pub fn request(&self) -> &WriteRequest {
        &self.request
    }
}

/// Current status documents of the entities of one environment.
#[derive(Clone)]
pub struct StatusStore {
    store: Arc<dyn DocumentStore>,
    env_uuid: String,
    history: StatusHistory,
}

impl StatusStore {
    pub fn new(store: Arc<dyn DocumentStore>, env_uuid: &str, history: StatusHistory) -> Self {
        Self {
            store,
            env_uuid: env_uuid.to_string(),
            history,
        }
    }

    /// Store id of the status document of `global_key`.
    pub fn doc_id(&self, global_key: &str) -> String {
        format!("{}:{}", self.env_uuid, global_key)
    }

    /// Current status of `global_key`; `NotFound(badge)` if it has none.
    pub async fn get(&self, global_key: &str, badge: &str) -> StatusResult<StatusInfo> {
        self.get_doc(global_key, badge).await.map(|doc| doc.to_info())
    }

    /// Full current status document, data keys unescaped. Exposes
    /// `never_set` to callers that aggregate status from children.
    pub async fn get_doc(&self, global_key: &str, badge: &str) -> StatusResult<StatusDoc> {
        let stored = self
            .store
            .find_status(&self.doc_id(global_key))
            .await
            .map_err(|err| StatusError::from_store(GET_CONTEXT, badge, err))?
            .ok_or_else(|| StatusError::NotFound {
                context: GET_CONTEXT,
                badge: badge.to_string(),
            })?;

        let mut doc = stored.doc;
        doc.status_data = unescape_keys(&doc.status_data);
        Ok(doc)
    }

    /// Builds the insert-if-absent request creating the status document of
    /// `global_key`, and records `doc` in the entity's history on the spot.
    ///
    /// The history write happens now, not when the request commits: a
    /// request that never commits leaves a spurious history entry behind.
    /// `doc` data keys must not be escaped yet.
    pub async fn create_insert_op(&self, global_key: &str, doc: StatusDoc) -> WriteRequest {
        let doc = StatusDoc {
            env_uuid: self.env_uuid.clone(),
            status_data: escape_keys(&doc.status_data),
            updated: doc.updated.or_else(|| Some(now_to_the_second())),
            ..doc
        };
        self.history.record(global_key, &doc).await;

        let id = self.doc_id(global_key);
        WriteRequest::new()
            .require(Precondition::DocMissing { id: id.clone() })
            .op(Op::Insert { id, doc })
    }

    /// Builds the unconditional removal of the status document of
    /// `global_key`. History is left for the pruner.
    pub fn create_remove_op(&self, global_key: &str) -> WriteRequest {
        WriteRequest::new().op(Op::Remove {
            id: self.doc_id(global_key),
        })
    }

    /// Records history for the write described by `params` and builds its
    /// revision-guarded update, composed with the leadership token if any.
    pub async fn prepare_set(&self, params: SetStatusParams) -> StatusResult<PreparedStatus> {
        let SetStatusParams {
            badge,
            global_key,
            status,
            message,
            raw_data,
            token,
        } = params;

        let doc = StatusDoc {
            env_uuid: self.env_uuid.clone(),
            status,
            status_info: message,
            status_data: escape_keys(&raw_data),
            updated: Some(now_to_the_second()),
            never_set: false,
        };
        self.history.record(&global_key, &doc).await;

        let request = update_status_request(self.store.as_ref(), &self.doc_id(&global_key), doc)
            .await
            .map_err(|err| StatusError::from_store(SET_CONTEXT, &badge, err))?;

        let request = match token {
            Some(token) => with_token(request, token.as_ref()).map_err(|err| {
                StatusError::Invalidated {
                    context: SET_CONTEXT,
                    reason: err.to_string(),
                }
            })?,
            None => request,
        };

        Ok(PreparedStatus {
            badge,
            global_key,
            request,
        })
    }

    /// Executes a prepared write.
    ///
    /// A missing document and a revision that moved since `prepare_set`
    /// both surface as `NotFound(badge)`.
    pub async fn commit(&self, prepared: PreparedStatus) -> StatusResult<()> {
        let PreparedStatus { badge, request, .. } = prepared;
        self.store
            .run(request)
            .await
            .map_err(|err| StatusError::from_store(SET_CONTEXT, &badge, err))
    }

    /// Sets the status described by `params`.
    pub async fn set(&self, params: SetStatusParams) -> StatusResult<()> {
        let prepared = self.prepare_set(params).await?;
        self.commit(prepared).await
    }
}
