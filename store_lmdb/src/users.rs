//! LMDB implementation of UserStore.
//!
//! Key format: the raw user id bytes. Values are bincode-encoded
//! [`UserAccount`] records.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use idsync_store::users::{UserAccount, UserStore};
use idsync_store::StoreError;
use idsync_types::{ProfileStatus, Timestamp, UserId};

use crate::LmdbError;

pub struct LmdbUserStore {
    pub(crate) env: Arc<Env>,
    pub(crate) users_db: Database<Bytes, Bytes>,
}

impl UserStore for LmdbUserStore {
    fn get_user(&self, id: &UserId) -> Result<UserAccount, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .users_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("user '{}'", id)))?;
        let account: UserAccount = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(account)
    }

    fn put_user(&self, account: &UserAccount) -> Result<(), StoreError> {
        let bytes = bincode::serialize(account).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.users_db
            .put(&mut wtxn, account.id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn exists(&self, id: &UserId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .users_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.users_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn iter_verified_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.users_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let account: UserAccount = bincode::deserialize(val).map_err(LmdbError::from)?;
            if account.profile_status == ProfileStatus::Verified {
                results.push(account);
            }
        }
        Ok(results)
    }

    fn set_profile_status(
        &self,
        id: &UserId,
        status: ProfileStatus,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let val = self
            .users_db
            .get(&wtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("user '{}'", id)))?;
        let mut account: UserAccount = bincode::deserialize(val).map_err(LmdbError::from)?;

        account.profile_status = status;
        account.updated_at = now;
        if status == ProfileStatus::Blocked {
            account.chaincode = Some(String::new());
        }

        let bytes = bincode::serialize(&account).map_err(LmdbError::from)?;
        self.users_db
            .put(&mut wtxn, id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsync_types::ProfileRecord;

    fn open_test_env() -> (crate::LmdbEnvironment, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let env = crate::LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
        (env, dir)
    }

    fn make_user(id: &str, status: ProfileStatus) -> UserAccount {
        UserAccount {
            id: UserId::new(id),
            username: format!("u-{}", id),
            profile_url: Some(format!("http://{}.example", id)),
            chaincode: Some("secret".into()),
            profile_status: status,
            discord_id: None,
            profile: ProfileRecord::default(),
            updated_at: Timestamp::new(1_000),
        }
    }

    #[test]
    fn put_and_get_user() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        let user = make_user("alice", ProfileStatus::Verified);

        store.put_user(&user).unwrap();
        let loaded = store.get_user(&user.id).unwrap();
        assert_eq!(loaded.username, "u-alice");
        assert_eq!(loaded.profile_status, ProfileStatus::Verified);
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        let err = store.get_user(&UserId::new("ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn iter_verified_filters_status() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        store
            .put_user(&make_user("alice", ProfileStatus::Verified))
            .unwrap();
        store
            .put_user(&make_user("bob", ProfileStatus::Blocked))
            .unwrap();
        store
            .put_user(&make_user("carol", ProfileStatus::Verified))
            .unwrap();

        let verified = store.iter_verified_users().unwrap();
        assert_eq!(verified.len(), 2);
        assert_eq!(store.verified_user_count().unwrap(), 2);
        assert_eq!(store.user_count().unwrap(), 3);
    }

    #[test]
    fn blocking_clears_chaincode_and_stamps_updated_at() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        let user = make_user("alice", ProfileStatus::Verified);
        store.put_user(&user).unwrap();

        store
            .set_profile_status(&user.id, ProfileStatus::Blocked, Timestamp::new(9_000))
            .unwrap();

        let loaded = store.get_user(&user.id).unwrap();
        assert_eq!(loaded.profile_status, ProfileStatus::Blocked);
        assert_eq!(loaded.chaincode.as_deref(), Some(""));
        assert_eq!(loaded.updated_at, Timestamp::new(9_000));
        assert!(loaded.active_chaincode().is_none());
    }

    #[test]
    fn non_blocking_status_write_keeps_chaincode() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        let user = make_user("alice", ProfileStatus::Pending);
        store.put_user(&user).unwrap();

        store
            .set_profile_status(&user.id, ProfileStatus::Verified, Timestamp::new(2_000))
            .unwrap();

        let loaded = store.get_user(&user.id).unwrap();
        assert_eq!(loaded.profile_status, ProfileStatus::Verified);
        assert_eq!(loaded.chaincode.as_deref(), Some("secret"));
        assert_eq!(loaded.updated_at, Timestamp::new(2_000));
    }

    #[test]
    fn set_status_on_missing_user_fails() {
        let (env, _dir) = open_test_env();
        let store = env.user_store();
        let err = store
            .set_profile_status(&UserId::new("ghost"), ProfileStatus::Blocked, Timestamp::now())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
