//! Everything a typical caller of the status subsystem needs.
//!
//! ```
//! use statusdb::prelude::*;
//! ```

pub use crate::config::StatusConfig;
pub use crate::core::{
    GlobalKey, Status, StatusData, StatusDoc, StatusError, StatusInfo, StatusResult, Value,
    status_data_from_json,
};
pub use crate::facade::State;
pub use crate::leadership::{Lease, Token};
pub use crate::status::{PruneReport, SetStatusParams};
pub use crate::storage::{DocumentStore, InMemoryStore};
