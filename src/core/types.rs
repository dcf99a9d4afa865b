use super::{StatusData, StatusError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Current time truncated to whole seconds.
///
/// Status timestamps have always been stored at second precision; keep it
/// that way unless the stored representation changes too.
pub fn now_to_the_second() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Status value of an entity. Opaque to this crate beyond storage and
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Error,
    Started,
    Pending,
    Stopped,
    Down,
    Allocating,
    Installing,
    Unknown,
    Maintenance,
    Terminated,
    Blocked,
    Waiting,
    Active,
    Executing,
    Idle,
    Failed,
    Lost,
    Rebooting,
}

impl Status {
    pub const ALL: [Status; 18] = [
        Status::Error,
        Status::Started,
        Status::Pending,
        Status::Stopped,
        Status::Down,
        Status::Allocating,
        Status::Installing,
        Status::Unknown,
        Status::Maintenance,
        Status::Terminated,
        Status::Blocked,
        Status::Waiting,
        Status::Active,
        Status::Executing,
        Status::Idle,
        Status::Failed,
        Status::Lost,
        Status::Rebooting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Error => "error",
            Status::Started => "started",
            Status::Pending => "pending",
            Status::Stopped => "stopped",
            Status::Down => "down",
            Status::Allocating => "allocating",
            Status::Installing => "installing",
            Status::Unknown => "unknown",
            Status::Maintenance => "maintenance",
            Status::Terminated => "terminated",
            Status::Blocked => "blocked",
            Status::Waiting => "waiting",
            Status::Active => "active",
            Status::Executing => "executing",
            Status::Idle => "idle",
            Status::Failed => "failed",
            Status::Lost => "lost",
            Status::Rebooting => "rebooting",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusError::UnknownStatus(s.to_string()))
    }
}

/// Identifies one entity within an environment: the id of its status
/// document and the partition key of its history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalKey(String);

impl GlobalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn machine(id: &str) -> Self {
        Self(format!("m#{}", id))
    }

    pub fn unit(name: &str) -> Self {
        Self(format!("u#{}", name))
    }

    pub fn application(name: &str) -> Self {
        Self(format!("a#{}", name))
    }

    pub fn environment() -> Self {
        Self("e".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for GlobalKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlobalKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for GlobalKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// The current status record of one entity, as stored.
///
/// `status_data` holds escaped keys once the document reaches the store;
/// builders in [`crate::status`] take care of escaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDoc {
    pub env_uuid: String,
    pub status: Status,
    pub status_info: String,
    pub status_data: StatusData,
    /// Absent on records written before timestamps were tracked.
    pub updated: Option<DateTime<Utc>>,
    /// Set on records that have never been explicitly written. Higher
    /// layers derive such an entity's status from its children instead.
    pub never_set: bool,
}

impl StatusDoc {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            env_uuid: String::new(),
            status,
            status_info: message.into(),
            status_data: StatusData::new(),
            updated: None,
            never_set: false,
        }
    }

    pub fn with_data(mut self, data: StatusData) -> Self {
        self.status_data = data;
        self
    }

    pub fn updated_at(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn never_set(mut self) -> Self {
        self.never_set = true;
        self
    }

    /// Read view of this record. Data keys are returned as stored.
    pub fn to_info(&self) -> StatusInfo {
        StatusInfo {
            status: self.status,
            message: self.status_info.clone(),
            data: self.status_data.clone(),
            since: self.updated,
        }
    }
}

/// A status document together with its store-assigned revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStatus {
    pub doc: StatusDoc,
    pub txn_revno: u64,
}

/// One status as seen by callers: current or historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub status: Status,
    pub message: String,
    pub data: StatusData,
    pub since: Option<DateTime<Utc>>,
}

/// An immutable snapshot of one past status of one entity.
///
/// `id` comes from a counter shared by every entity in the store: ordering
/// ids is meaningful within one entity only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub env_uuid: String,
    pub entity_id: String,
    pub status: Status,
    pub status_info: String,
    /// Already escaped.
    pub status_data: StatusData,
    pub updated: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub fn to_info(&self) -> StatusInfo {
        StatusInfo {
            status: self.status,
            message: self.status_info.clone(),
            data: self.status_data.clone(),
            since: self.updated,
        }
    }
}
