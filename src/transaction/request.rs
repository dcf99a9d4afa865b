// ============================================================================
// Conditional Write Requests
// ============================================================================
//
// A WriteRequest is an ordered list of preconditions plus the ops to apply
// if, and only if, every precondition holds at commit time. Stores evaluate
// the whole request under one critical section: either all ops apply or
// none do.
//
// ============================================================================

use super::Op;
use std::fmt;
use std::sync::Arc;

/// A capability that can stop holding at any time, re-checked by the store
/// at commit.
pub trait Guard: Send + Sync + fmt::Debug {
    /// Whether the capability is still held.
    fn holds(&self) -> bool;

    /// Human readable name of the capability, used in errors.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub enum Precondition {
    /// The status document must not exist.
    DocMissing { id: String },

    /// The status document must exist at exactly this revision.
    RevnoEquals { id: String, txn_revno: u64 },

    /// The guarded capability must still be held.
    Held(Arc<dyn Guard>),
}

impl Precondition {
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            Precondition::DocMissing { id }
            | Precondition::RevnoEquals { id, .. } => Some(id),
            Precondition::Held(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    preconditions: Vec<Precondition>,
    ops: Vec<Op>,
}

impl WriteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a precondition, evaluated after those already present.
    pub fn require(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn op(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    /// Append `other`'s preconditions and ops after this request's own.
    pub fn with(mut self, other: WriteRequest) -> Self {
        self.extend(other);
        self
    }

    pub fn extend(&mut self, other: WriteRequest) {
        self.preconditions.extend(other.preconditions);
        self.ops.extend(other.ops);
    }

    pub fn push_precondition(&mut self, precondition: Precondition) {
        self.preconditions.push(precondition);
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.preconditions.is_empty() && self.ops.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Precondition>, Vec<Op>) {
        (self.preconditions, self.ops)
    }
}
