//! Diff storage trait.

use crate::StoreError;
use idsync_types::{ApprovalState, DiffId, ProfileRecord, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A proposed profile replacement awaiting human review.
///
/// Immutable after creation except for the `approval` transition
/// PENDING -> NOT APPROVED. Diffs are never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffRecord {
    pub owner: UserId,
    pub created_at: Timestamp,
    pub approval: ApprovalState,
    pub profile: ProfileRecord,
}

impl DiffRecord {
    /// A fresh PENDING diff for `owner` wrapping `profile`.
    pub fn pending(owner: UserId, profile: ProfileRecord, created_at: Timestamp) -> Self {
        Self {
            owner,
            created_at,
            approval: ApprovalState::Pending,
            profile,
        }
    }
}

/// Trait for diff storage operations.
pub trait DiffStore {
    /// Insert a diff and return the id the store minted for it.
    fn add_diff(&self, record: &DiffRecord) -> Result<DiffId, StoreError>;

    fn get_diff(&self, id: &DiffId) -> Result<DiffRecord, StoreError>;

    /// The most recently created diff for `owner` in the given approval
    /// state (ordered by `created_at`), or `None` when there is none.
    fn latest_for_user(
        &self,
        owner: &UserId,
        approval: ApprovalState,
    ) -> Result<Option<(DiffId, DiffRecord)>, StoreError>;

    /// Transition a diff's approval state. The record is otherwise
    /// immutable.
    fn set_approval(&self, id: &DiffId, approval: ApprovalState) -> Result<(), StoreError>;

    fn diff_count(&self) -> Result<u64, StoreError>;
}
