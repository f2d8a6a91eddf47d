//! LMDB storage backend for the idsync service.
//!
//! Implements all storage traits from `idsync-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment.

pub mod audit;
pub mod diffs;
pub mod environment;
pub mod error;
pub mod store;
pub mod users;

pub use audit::LmdbAuditStore;
pub use diffs::LmdbDiffStore;
pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use store::LmdbStore;
pub use users::LmdbUserStore;
