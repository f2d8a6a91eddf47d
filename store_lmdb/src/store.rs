//! Combined store handle.

use std::path::Path;

use idsync_store::{
    AuditEntry, AuditStore, DiffRecord, DiffStore, StoreError, UserAccount, UserStore,
};
use idsync_types::{ApprovalState, DiffId, ProfileStatus, Timestamp, UserId};

use crate::audit::LmdbAuditStore;
use crate::diffs::LmdbDiffStore;
use crate::environment::LmdbEnvironment;
use crate::error::LmdbError;
use crate::users::LmdbUserStore;

/// All three stores behind one handle, for callers generic over a single
/// combined store type. Each delegate shares the same LMDB environment.
pub struct LmdbStore {
    users: LmdbUserStore,
    diffs: LmdbDiffStore,
    audit: LmdbAuditStore,
}

impl LmdbStore {
    /// Open or create the environment at `path` and wire up all stores.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        let env = LmdbEnvironment::open(path, map_size)?;
        Ok(Self {
            users: env.user_store(),
            diffs: env.diff_store(),
            audit: env.audit_store(),
        })
    }
}

impl UserStore for LmdbStore {
    fn get_user(&self, id: &UserId) -> Result<UserAccount, StoreError> {
        self.users.get_user(id)
    }

    fn put_user(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.users.put_user(account)
    }

    fn exists(&self, id: &UserId) -> Result<bool, StoreError> {
        self.users.exists(id)
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        self.users.user_count()
    }

    fn iter_verified_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        self.users.iter_verified_users()
    }

    fn set_profile_status(
        &self,
        id: &UserId,
        status: ProfileStatus,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        self.users.set_profile_status(id, status, now)
    }
}

impl DiffStore for LmdbStore {
    fn add_diff(&self, record: &DiffRecord) -> Result<DiffId, StoreError> {
        self.diffs.add_diff(record)
    }

    fn get_diff(&self, id: &DiffId) -> Result<DiffRecord, StoreError> {
        self.diffs.get_diff(id)
    }

    fn latest_for_user(
        &self,
        owner: &UserId,
        approval: ApprovalState,
    ) -> Result<Option<(DiffId, DiffRecord)>, StoreError> {
        self.diffs.latest_for_user(owner, approval)
    }

    fn set_approval(&self, id: &DiffId, approval: ApprovalState) -> Result<(), StoreError> {
        self.diffs.set_approval(id, approval)
    }

    fn diff_count(&self) -> Result<u64, StoreError> {
        self.diffs.diff_count()
    }
}

impl AuditStore for LmdbStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.audit.append(entry)
    }

    fn entry_count(&self) -> Result<u64, StoreError> {
        self.audit.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DEFAULT_MAP_SIZE;
    use idsync_types::ProfileRecord;

    #[test]
    fn combined_handle_reaches_all_three_stores() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbStore::open(dir.path(), DEFAULT_MAP_SIZE).unwrap();

        let account = UserAccount {
            id: UserId::new("u1"),
            username: "u1".into(),
            profile_url: None,
            chaincode: Some("secret".into()),
            profile_status: ProfileStatus::Pending,
            discord_id: None,
            profile: ProfileRecord::default(),
            updated_at: Timestamp::new(0),
        };
        store.put_user(&account).unwrap();
        assert_eq!(store.user_count().unwrap(), 1);

        let diff_id = store
            .add_diff(&DiffRecord::pending(
                UserId::new("u1"),
                ProfileRecord::default(),
                Timestamp::new(1),
            ))
            .unwrap();
        assert_eq!(store.get_diff(&diff_id).unwrap().owner, UserId::new("u1"));

        let entry = AuditEntry::new(
            idsync_store::AuditKind::ProfileSkipped,
            Timestamp::new(1),
            idsync_store::AuditMeta::default(),
            serde_json::json!({}),
        );
        store.append(&entry).unwrap();
        assert_eq!(store.entry_count().unwrap(), 1);
    }
}
