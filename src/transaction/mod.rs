// ============================================================================
// Transaction Module
// ============================================================================
//
// Conditional multi-op writes against the status collection.
//
// Design Patterns Used:
// - Command Pattern: ops are values, applied by the store
// - Specification Pattern: preconditions evaluated before any op applies
//
// ============================================================================

pub mod op;
pub mod request;

pub use op::Op;
pub use request::{Guard, Precondition, WriteRequest};
