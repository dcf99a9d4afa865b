// ============================================================================
// Concurrency Guard
// ============================================================================
//
// Status updates are compare-and-swap on the document's store revision.
// A request built here and executed late fails instead of overwriting a
// newer document.
//
// ============================================================================

use crate::core::{Result, StatusDoc};
use crate::leadership::{Token, TokenError};
use crate::storage::DocumentStore;
use crate::transaction::{Op, Precondition, WriteRequest};

/// Reads the document's current revision and builds an update that only
/// applies while the revision is unchanged.
///
/// Fails with `DbError::NotFound` when the document does not exist.
pub async fn update_status_request(
    store: &dyn DocumentStore,
    id: &str,
    doc: StatusDoc,
) -> Result<WriteRequest> {
    let txn_revno = store.read_txn_revno(id).await?;
    Ok(WriteRequest::new()
        .require(Precondition::RevnoEquals {
            id: id.to_string(),
            txn_revno,
        })
        .op(Op::Update {
            id: id.to_string(),
            doc,
        }))
}

/// Composes `request` with the token's own check. Both must pass at
/// commit for anything to apply.
pub fn with_token(
    mut request: WriteRequest,
    token: &dyn Token,
) -> std::result::Result<WriteRequest, TokenError> {
    token.check(&mut request)?;
    Ok(request)
}
