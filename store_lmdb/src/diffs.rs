//! LMDB implementation of DiffStore.
//!
//! Two databases: `diffs` maps a minted [`DiffId`] to the bincode-encoded
//! record, and `diffs_by_owner` is an index with composite keys
//! `owner ++ 0x00 ++ approval_tag ++ created_at_be ++ id` whose values are
//! the id bytes. The big-endian timestamp makes a reverse prefix scan yield
//! the most recently created diff first. User ids must not contain NUL.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use idsync_store::diffs::{DiffRecord, DiffStore};
use idsync_store::StoreError;
use idsync_types::{ApprovalState, DiffId, Timestamp, UserId};

use crate::LmdbError;

pub struct LmdbDiffStore {
    pub(crate) env: Arc<Env>,
    pub(crate) diffs_db: Database<Bytes, Bytes>,
    pub(crate) diffs_by_owner_db: Database<Bytes, Bytes>,
}

fn approval_tag(state: ApprovalState) -> u8 {
    match state {
        ApprovalState::Pending => 0,
        ApprovalState::NotApproved => 1,
        ApprovalState::Approved => 2,
    }
}

/// Index key prefix shared by all diffs of one owner in one approval state.
fn owner_prefix(owner: &UserId, approval: ApprovalState) -> Vec<u8> {
    let owner_bytes = owner.as_str().as_bytes();
    let mut key = Vec::with_capacity(owner_bytes.len() + 2);
    key.extend_from_slice(owner_bytes);
    key.push(0);
    key.push(approval_tag(approval));
    key
}

fn index_key(
    owner: &UserId,
    approval: ApprovalState,
    created_at: Timestamp,
    id: &DiffId,
) -> Vec<u8> {
    let mut key = owner_prefix(owner, approval);
    key.extend_from_slice(&created_at.as_millis().to_be_bytes());
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

/// Increment a byte prefix to form an exclusive upper bound for range
/// scans. Returns `None` when the prefix is all 0xFF (scan to the end).
pub(crate) fn increment_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.last_mut() {
        if *last == 0xFF {
            upper.pop();
        } else {
            *last += 1;
            return Some(upper);
        }
    }
    None
}

impl DiffStore for LmdbDiffStore {
    fn add_diff(&self, record: &DiffRecord) -> Result<DiffId, StoreError> {
        let id = DiffId::generate();
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.diffs_db
            .put(&mut wtxn, id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        let idx = index_key(&record.owner, record.approval, record.created_at, &id);
        self.diffs_by_owner_db
            .put(&mut wtxn, &idx, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(id)
    }

    fn get_diff(&self, id: &DiffId) -> Result<DiffRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .diffs_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("diff '{}'", id)))?;
        let record: DiffRecord = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(record)
    }

    fn latest_for_user(
        &self,
        owner: &UserId,
        approval: ApprovalState,
    ) -> Result<Option<(DiffId, DiffRecord)>, StoreError> {
        let prefix = owner_prefix(owner, approval);
        let upper = increment_prefix(&prefix);

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let lower_bound = Bound::Included(prefix.as_slice());
        let upper_bound = match upper.as_ref() {
            Some(u) => Bound::Excluded(u.as_slice()),
            None => Bound::Unbounded,
        };
        let bounds = (lower_bound, upper_bound);
        let mut iter = self
            .diffs_by_owner_db
            .rev_range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let Some(result) = iter.next() else {
            return Ok(None);
        };
        let (_key, id_bytes) = result.map_err(LmdbError::from)?;
        let id_str = std::str::from_utf8(id_bytes)
            .map_err(|_| StoreError::Corruption("diff index value is not valid utf-8".into()))?;
        let val = self
            .diffs_db
            .get(&rtxn, id_bytes)
            .map_err(LmdbError::from)?
            .ok_or_else(|| {
                StoreError::Corruption(format!("diff index points at missing diff '{}'", id_str))
            })?;
        let record: DiffRecord = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(Some((DiffId::new(id_str), record)))
    }

    fn set_approval(&self, id: &DiffId, approval: ApprovalState) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let val = self
            .diffs_db
            .get(&wtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("diff '{}'", id)))?;
        let mut record: DiffRecord = bincode::deserialize(val).map_err(LmdbError::from)?;

        if record.approval == approval {
            return Ok(());
        }

        let old_idx = index_key(&record.owner, record.approval, record.created_at, id);
        record.approval = approval;
        let new_idx = index_key(&record.owner, record.approval, record.created_at, id);
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;

        self.diffs_db
            .put(&mut wtxn, id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        self.diffs_by_owner_db
            .delete(&mut wtxn, &old_idx)
            .map_err(LmdbError::from)?;
        self.diffs_by_owner_db
            .put(&mut wtxn, &new_idx, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn diff_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.diffs_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
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

    fn profile(designation: &str) -> ProfileRecord {
        ProfileRecord {
            first_name: "John".into(),
            designation: designation.into(),
            ..ProfileRecord::default()
        }
    }

    fn pending_diff(owner: &str, designation: &str, at: u64) -> DiffRecord {
        DiffRecord::pending(
            UserId::new(owner),
            profile(designation),
            Timestamp::new(at),
        )
    }

    #[test]
    fn add_and_get_roundtrip() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();

        let id = store.add_diff(&pending_diff("alice", "Eng", 1_000)).unwrap();
        let loaded = store.get_diff(&id).unwrap();
        assert_eq!(loaded.owner, UserId::new("alice"));
        assert_eq!(loaded.approval, ApprovalState::Pending);
        assert_eq!(loaded.profile.designation, "Eng");
    }

    #[test]
    fn get_missing_diff_is_not_found() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();
        let err = store.get_diff(&DiffId::new("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn latest_for_user_orders_by_created_at() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();

        store.add_diff(&pending_diff("alice", "old", 1_000)).unwrap();
        let newest = store.add_diff(&pending_diff("alice", "new", 3_000)).unwrap();
        store.add_diff(&pending_diff("alice", "mid", 2_000)).unwrap();
        // Another owner must not leak into alice's scan.
        store.add_diff(&pending_diff("bob", "noise", 9_000)).unwrap();

        let (id, record) = store
            .latest_for_user(&UserId::new("alice"), ApprovalState::Pending)
            .unwrap()
            .expect("pending diff");
        assert_eq!(id, newest);
        assert_eq!(record.profile.designation, "new");
    }

    #[test]
    fn latest_for_user_none_when_empty() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();
        let found = store
            .latest_for_user(&UserId::new("alice"), ApprovalState::Pending)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn owner_prefix_does_not_match_longer_id() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();

        store.add_diff(&pending_diff("alice2", "other", 5_000)).unwrap();
        let found = store
            .latest_for_user(&UserId::new("alice"), ApprovalState::Pending)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn set_approval_moves_index_entry() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();
        let owner = UserId::new("alice");

        let id = store.add_diff(&pending_diff("alice", "Eng", 1_000)).unwrap();
        store
            .set_approval(&id, ApprovalState::NotApproved)
            .unwrap();

        assert!(store
            .latest_for_user(&owner, ApprovalState::Pending)
            .unwrap()
            .is_none());
        let (rejected_id, rejected) = store
            .latest_for_user(&owner, ApprovalState::NotApproved)
            .unwrap()
            .expect("rejected diff");
        assert_eq!(rejected_id, id);
        assert_eq!(rejected.approval, ApprovalState::NotApproved);
        assert_eq!(store.diff_count().unwrap(), 1);
    }

    #[test]
    fn set_approval_is_idempotent() {
        let (env, _dir) = open_test_env();
        let store = env.diff_store();

        let id = store.add_diff(&pending_diff("alice", "Eng", 1_000)).unwrap();
        store.set_approval(&id, ApprovalState::NotApproved).unwrap();
        store.set_approval(&id, ApprovalState::NotApproved).unwrap();

        let loaded = store.get_diff(&id).unwrap();
        assert_eq!(loaded.approval, ApprovalState::NotApproved);
    }
}
