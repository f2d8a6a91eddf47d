use idsync_chaincode::ChaincodeError;
use idsync_reconcile::ReconcileError;
use idsync_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(String),

    /// A correctness-critical store operation failed. These surface to the
    /// caller instead of being swallowed; a lost diff or status write is
    /// data loss.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Challenge transport failure. The account was already recorded as
    /// BLOCKED by the time this propagates.
    #[error("verification failed: {0}")]
    Verification(#[from] ChaincodeError),

    /// The account cannot be challenged at all (no profile URL, no
    /// chaincode on file).
    #[error("account is not verifiable: {0}")]
    NotVerifiable(String),

    /// The account already holds VERIFIED status; re-verification is a
    /// caller mistake, not a challenge to run.
    #[error("already verified")]
    AlreadyVerified,

    #[error("chaincode hashing failed: {0}")]
    Hashing(String),
}
