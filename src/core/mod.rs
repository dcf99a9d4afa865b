pub mod error;
pub mod escape;
pub mod types;
pub mod value;

pub use error::{DbError, Result, StatusError, StatusResult};
pub use escape::{escape_keys, has_reserved_keys, unescape_keys};
pub use types::{
    GlobalKey, HistoryEntry, Status, StatusDoc, StatusInfo, StoredStatus, now_to_the_second,
};
pub use value::{StatusData, Value, status_data_from_json};
