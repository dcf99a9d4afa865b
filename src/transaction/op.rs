// ============================================================================
// Status Document Operations
// ============================================================================
//
// Each Op is one mutation of the status collection. Ops only ever run as
// part of a WriteRequest, after every precondition of that request holds.
//
// ============================================================================

use crate::core::StatusDoc;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Insert a new status document. Pair with `Precondition::DocMissing`
    /// for insert-if-absent semantics.
    Insert { id: String, doc: StatusDoc },

    /// Replace the fields of an existing status document. A no-op when the
    /// document is missing.
    Update { id: String, doc: StatusDoc },

    /// Delete a status document. A no-op when the document is missing.
    Remove { id: String },
}

impl Op {
    /// Id of the document this op touches.
    pub fn doc_id(&self) -> &str {
        match self {
            Op::Insert { id, .. } => id,
            Op::Update { id, .. } => id,
            Op::Remove { id } => id,
        }
    }
}
