//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::audit::LmdbAuditStore;
use crate::diffs::LmdbDiffStore;
use crate::error::LmdbError;
use crate::users::LmdbUserStore;

const USERS_DB: &str = "users";
const DIFFS_DB: &str = "diffs";
const DIFFS_BY_OWNER_DB: &str = "diffs_by_owner";
const AUDIT_DB: &str = "audit";

/// Default LMDB map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Wraps the LMDB environment and all database handles.
///
/// Per-trait stores hand out cheap copies of the shared [`Env`]; the
/// environment itself stays alive for as long as any of them does.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    users_db: Database<Bytes, Bytes>,
    diffs_db: Database<Bytes, Bytes>,
    diffs_by_owner_db: Database<Bytes, Bytes>,
    audit_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The path must be an existing directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(8)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let users_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(USERS_DB))?;
        let diffs_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(DIFFS_DB))?;
        let diffs_by_owner_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(DIFFS_BY_OWNER_DB))?;
        let audit_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(AUDIT_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            users_db,
            diffs_db,
            diffs_by_owner_db,
            audit_db,
        })
    }

    pub fn user_store(&self) -> LmdbUserStore {
        LmdbUserStore {
            env: self.env.clone(),
            users_db: self.users_db,
        }
    }

    pub fn diff_store(&self) -> LmdbDiffStore {
        LmdbDiffStore {
            env: self.env.clone(),
            diffs_db: self.diffs_db,
            diffs_by_owner_db: self.diffs_by_owner_db,
        }
    }

    pub fn audit_store(&self) -> LmdbAuditStore {
        LmdbAuditStore {
            env: self.env.clone(),
            audit_db: self.audit_db,
        }
    }
}
