// ============================================================================
// Leadership Capability
// ============================================================================
//
// Writes on behalf of an application may require proof that the writer is
// still its leader. Election happens elsewhere; this module only consumes
// the resulting capability through the `Token` trait.
//
// ============================================================================

use crate::transaction::{Guard, Precondition, WriteRequest};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("{holder:?} is not leader of {name:?}")]
    NotHeld { name: String, holder: String },
}

/// Proof of leadership attached to a write.
pub trait Token: Send + Sync + fmt::Debug {
    /// Fails if leadership is already lost. Otherwise adds whatever
    /// preconditions `request` needs so that the store rejects it if
    /// leadership is lost before commit; ops are left untouched.
    fn check(&self, request: &mut WriteRequest) -> Result<(), TokenError>;
}

#[derive(Debug)]
struct LeaseState {
    name: String,
    holder: String,
    held: AtomicBool,
}

impl Guard for LeaseState {
    fn holds(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        format!("{:?} is not leader of {:?}", self.holder, self.name)
    }
}

/// A revocable leadership claim of `holder` over `name`.
///
/// Tokens minted from a lease stay linked to it: revoking the lease
/// invalidates every outstanding token, including ones attached to writes
/// that have not committed yet.
#[derive(Debug, Clone)]
pub struct Lease {
    state: Arc<LeaseState>,
}

impl Lease {
    pub fn claim(name: &str, holder: &str) -> Self {
        Self {
            state: Arc::new(LeaseState {
                name: name.to_string(),
                holder: holder.to_string(),
                held: AtomicBool::new(true),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn holder(&self) -> &str {
        &self.state.holder
    }

    pub fn is_held(&self) -> bool {
        self.state.holds()
    }

    pub fn revoke(&self) {
        self.state.held.store(false, Ordering::SeqCst);
    }

    pub fn token(&self) -> Arc<dyn Token> {
        Arc::new(LeaseToken {
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
struct LeaseToken {
    state: Arc<LeaseState>,
}

impl Token for LeaseToken {
    fn check(&self, request: &mut WriteRequest) -> Result<(), TokenError> {
        if !self.state.holds() {
            return Err(TokenError::NotHeld {
                name: self.state.name.clone(),
                holder: self.state.holder.clone(),
            });
        }
        request.push_precondition(Precondition::Held(self.state.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Op;

    #[test]
    fn test_valid_token_adds_guard_only() {
        let lease = Lease::claim("mysql", "mysql/0");
        let mut request = WriteRequest::new().op(Op::Remove { id: "x".into() });

        lease.token().check(&mut request).unwrap();

        assert_eq!(request.ops().len(), 1);
        assert_eq!(request.preconditions().len(), 1);
        match &request.preconditions()[0] {
            Precondition::Held(guard) => assert!(guard.holds()),
            other => panic!("unexpected precondition {:?}", other),
        }
    }

    #[test]
    fn test_revoked_token_fails_check() {
        let lease = Lease::claim("mysql", "mysql/0");
        let token = lease.token();
        lease.revoke();

        let mut request = WriteRequest::new();
        let err = token.check(&mut request).unwrap_err();

        assert_eq!(
            err,
            TokenError::NotHeld { name: "mysql".into(), holder: "mysql/0".into() }
        );
        assert!(request.is_empty());
    }

    #[test]
    fn test_revocation_reaches_attached_guard() {
        let lease = Lease::claim("mysql", "mysql/0");
        let mut request = WriteRequest::new();
        lease.token().check(&mut request).unwrap();

        lease.revoke();

        match &request.preconditions()[0] {
            Precondition::Held(guard) => {
                assert!(!guard.holds());
                assert!(guard.describe().contains("mysql/0"));
            }
            other => panic!("unexpected precondition {:?}", other),
        }
    }
}
