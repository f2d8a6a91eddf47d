//! LMDB implementation of AuditStore.
//!
//! Key format: `at_be ++ ulid` so entries iterate in time order and
//! same-millisecond appends never collide. Values are JSON rather than
//! bincode: audit bodies are free-form JSON and the review tooling reads
//! them as-is.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};
use ulid::Ulid;

use idsync_store::audit::{AuditEntry, AuditStore};
use idsync_store::StoreError;

use crate::LmdbError;

pub struct LmdbAuditStore {
    pub(crate) env: Arc<Env>,
    pub(crate) audit_db: Database<Bytes, Bytes>,
}

fn audit_key(entry: &AuditEntry) -> Vec<u8> {
    let ulid = Ulid::new().to_string();
    let mut key = Vec::with_capacity(8 + ulid.len());
    key.extend_from_slice(&entry.at.as_millis().to_be_bytes());
    key.extend_from_slice(ulid.as_bytes());
    key
}

impl AuditStore for LmdbAuditStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let key = audit_key(entry);
        let bytes = serde_json::to_vec(entry).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.audit_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn entry_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.audit_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
