//! Abstract storage traits for the idsync service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.
//!
//! There is deliberately no cross-store transaction surface: the service
//! makes no atomicity guarantees across user, diff, and audit writes.

pub mod audit;
pub mod diffs;
pub mod error;
pub mod users;

pub use audit::{AuditEntry, AuditKind, AuditMeta, AuditStore};
pub use diffs::{DiffRecord, DiffStore};
pub use error::StoreError;
pub use users::{UserAccount, UserStore};
