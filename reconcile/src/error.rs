use idsync_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A correctness-critical store write or read failed. Audit-log
    /// appends never surface here; they are best-effort.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}
