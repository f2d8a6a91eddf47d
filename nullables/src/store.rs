//! Nullable store — thread-safe in-memory storage for testing.

use idsync_store::{
    AuditEntry, AuditStore, DiffRecord, DiffStore, StoreError, UserAccount, UserStore,
};
use idsync_types::{ApprovalState, DiffId, ProfileStatus, Timestamp, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory user + diff + audit store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    users: Mutex<HashMap<String, UserAccount>>,
    diffs: Mutex<Vec<(DiffId, DiffRecord)>>,
    audits: Mutex<Vec<AuditEntry>>,
    /// Ids of stores whose next write should fail, for error-path tests.
    fail_writes: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            diffs: Mutex::new(Vec::new()),
            audits: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Seed an account directly, bypassing the trait surface.
    pub fn seed_user(&self, account: UserAccount) {
        self.users
            .lock()
            .unwrap()
            .insert(account.id.as_str().to_string(), account);
    }

    /// Make every subsequent diff/user write fail with a backend error.
    pub fn fail_next_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// All audit entries appended so far, in order. The production service
    /// never reads these back; tests do.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audits.lock().unwrap().clone()
    }

    /// Every stored diff for `owner`, in insertion order.
    pub fn diffs_for(&self, owner: &UserId) -> Vec<(DiffId, DiffRecord)> {
        self.diffs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, d)| &d.owner == owner)
            .cloned()
            .collect()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            Err(StoreError::Backend("injected write failure".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for NullStore {
    fn get_user(&self, id: &UserId) -> Result<UserAccount, StoreError> {
        self.users
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_user(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.check_writable()?;
        self.users
            .lock()
            .unwrap()
            .insert(account.id.as_str().to_string(), account.clone());
        Ok(())
    }

    fn exists(&self, id: &UserId) -> Result<bool, StoreError> {
        Ok(self.users.lock().unwrap().contains_key(id.as_str()))
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    fn iter_verified_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let mut verified: Vec<UserAccount> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.profile_status.is_synced())
            .cloned()
            .collect();
        verified.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(verified)
    }

    fn set_profile_status(
        &self,
        id: &UserId,
        status: ProfileStatus,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let account = users
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        account.profile_status = status;
        account.updated_at = now;
        if status == ProfileStatus::Blocked {
            account.chaincode = Some(String::new());
        }
        Ok(())
    }
}

impl DiffStore for NullStore {
    fn add_diff(&self, record: &DiffRecord) -> Result<DiffId, StoreError> {
        self.check_writable()?;
        let id = DiffId::generate();
        self.diffs
            .lock()
            .unwrap()
            .push((id.clone(), record.clone()));
        Ok(id)
    }

    fn get_diff(&self, id: &DiffId) -> Result<DiffRecord, StoreError> {
        self.diffs
            .lock()
            .unwrap()
            .iter()
            .find(|(did, _)| did == id)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn latest_for_user(
        &self,
        owner: &UserId,
        approval: ApprovalState,
    ) -> Result<Option<(DiffId, DiffRecord)>, StoreError> {
        // Insertion order breaks created_at ties, matching the LMDB
        // backend's id-ordered index.
        Ok(self
            .diffs
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, (_, d))| &d.owner == owner && d.approval == approval)
            .max_by_key(|(i, (_, d))| (d.created_at, *i))
            .map(|(_, (id, d))| (id.clone(), d.clone())))
    }

    fn set_approval(&self, id: &DiffId, approval: ApprovalState) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut diffs = self.diffs.lock().unwrap();
        let (_, record) = diffs
            .iter_mut()
            .find(|(did, _)| did == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.approval = approval;
        Ok(())
    }

    fn diff_count(&self) -> Result<u64, StoreError> {
        Ok(self.diffs.lock().unwrap().len() as u64)
    }
}

impl AuditStore for NullStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.audits.lock().unwrap().push(entry.clone());
        Ok(())
    }

    fn entry_count(&self) -> Result<u64, StoreError> {
        Ok(self.audits.lock().unwrap().len() as u64)
    }
}
