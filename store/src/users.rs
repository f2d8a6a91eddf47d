//! User account storage trait.

use crate::StoreError;
use idsync_types::{ProfileRecord, ProfileStatus, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A user account as provisioned by the membership side.
///
/// This service never creates accounts. It reads them and partially updates
/// them: `profile_status` and `updated_at` on every status write, and
/// `chaincode` cleared to the empty string when an account is blocked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    /// Base URL of the user's self-hosted profile service.
    pub profile_url: Option<String>,
    /// Shared secret proving service ownership. `None` means never
    /// provisioned; `Some("")` means cleared on block and awaiting
    /// out-of-band rotation.
    pub chaincode: Option<String>,
    pub profile_status: ProfileStatus,
    /// Chat handle notified when this account gets blocked.
    pub discord_id: Option<String>,
    /// Canonical profile, ground truth until a reviewer approves a diff.
    /// Accounts that have never synced carry the empty record.
    #[serde(default)]
    pub profile: ProfileRecord,
    pub updated_at: Timestamp,
}

impl UserAccount {
    /// The chaincode, if it is present and non-empty.
    pub fn active_chaincode(&self) -> Option<&str> {
        self.chaincode.as_deref().filter(|c| !c.is_empty())
    }
}

/// Trait for user account storage operations.
pub trait UserStore {
    fn get_user(&self, id: &UserId) -> Result<UserAccount, StoreError>;
    fn put_user(&self, account: &UserAccount) -> Result<(), StoreError>;
    fn exists(&self, id: &UserId) -> Result<bool, StoreError>;
    fn user_count(&self) -> Result<u64, StoreError>;
    fn iter_verified_users(&self) -> Result<Vec<UserAccount>, StoreError>;

    /// Merge a status change onto an existing account: writes
    /// `profile_status`, stamps `updated_at`, and clears `chaincode` when
    /// the new status is [`ProfileStatus::Blocked`]. Errors with
    /// [`StoreError::NotFound`] if the account does not exist.
    fn set_profile_status(
        &self,
        id: &UserId,
        status: ProfileStatus,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Count verified users without allocating the full result set.
    fn verified_user_count(&self) -> Result<u64, StoreError> {
        self.iter_verified_users().map(|v| v.len() as u64)
    }
}
