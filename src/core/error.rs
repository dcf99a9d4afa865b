use thiserror::Error;

/// Errors reported by a [`DocumentStore`](crate::storage::DocumentStore).
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Document '{0}' not found")]
    NotFound(String),

    /// A precondition of a write request did not hold; nothing was applied.
    #[error("Transaction aborted: assertion on '{0}' failed")]
    Aborted(String),

    /// A capability guard attached to a write request no longer holds.
    #[error("Transaction invalidated: {0}")]
    Invalidated(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl DbError {
    /// Whether this error belongs to the "not found" class.
    ///
    /// The store reports a failed revision assertion in the same class as a
    /// missing document, so callers cannot tell a lost race from a removed
    /// entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Aborted(_))
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Errors surfaced by the status subsystem to its callers.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("{context}: {badge} not found")]
    NotFound {
        context: &'static str,
        badge: String,
    },

    #[error("{context}: leadership token invalidated: {reason}")]
    Invalidated {
        context: &'static str,
        reason: String,
    },

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: DbError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown status {0:?}")]
    UnknownStatus(String),
}

impl StatusError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalidated(&self) -> bool {
        matches!(self, Self::Invalidated { .. })
    }

    /// The badge carried by a `NotFound` error.
    pub fn badge(&self) -> Option<&str> {
        match self {
            Self::NotFound { badge, .. } => Some(badge),
            _ => None,
        }
    }

    /// Classifies a store failure for the operation named by `context`.
    pub(crate) fn from_store(context: &'static str, badge: &str, err: DbError) -> Self {
        match err {
            DbError::Invalidated(reason) => Self::Invalidated { context, reason },
            err if err.is_not_found() => Self::NotFound {
                context,
                badge: badge.to_string(),
            },
            source => Self::Store { context, source },
        }
    }
}

pub type StatusResult<T> = std::result::Result<T, StatusError>;
