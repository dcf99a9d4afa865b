pub mod engine;
pub mod memory;

pub use engine::{DocumentStore, HistoryQuery, StatusChange};
pub use memory::InMemoryStore;
