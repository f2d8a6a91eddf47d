//! Fundamental types for the idsync profile reconciliation service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: the self-reported profile record, account and diff status
//! enums, identifier newtypes, and millisecond timestamps.

pub mod ids;
pub mod profile;
pub mod state;
pub mod time;

pub use ids::{DiffId, SessionId, UserId};
pub use profile::ProfileRecord;
pub use state::{ApprovalState, ProfileStatus};
pub use time::Timestamp;
