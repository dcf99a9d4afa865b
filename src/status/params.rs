use crate::core::{Status, StatusData};
use crate::leadership::Token;
use std::sync::Arc;

/// Configures one status write. All fields are presumed valid.
#[derive(Debug, Clone)]
pub struct SetStatusParams {
    /// Names the entity kind in any NotFound error
    pub badge: String,

    /// The entity whose status is written
    pub global_key: String,

    pub status: Status,

    /// Optional elaboration of the status
    pub message: String,

    /// Arbitrary data elaborating on status and message. Keys are not
    /// escaped yet.
    pub raw_data: StatusData,

    /// If present, the write only applies while this token stays valid
    pub token: Option<Arc<dyn Token>>,
}

impl SetStatusParams {
    pub fn new(global_key: &str, badge: &str, status: Status) -> Self {
        Self {
            badge: badge.to_string(),
            global_key: global_key.to_string(),
            status,
            message: String::new(),
            raw_data: StatusData::new(),
            token: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn data(mut self, data: StatusData) -> Self {
        self.raw_data = data;
        self
    }

    pub fn token(mut self, token: Arc<dyn Token>) -> Self {
        self.token = Some(token);
        self
    }
}
