//! The idsync service layer.
//!
//! Ties the store, the profile-service client, the reconciler, the
//! chaincode verifier, and the notification client into the four
//! operations the RPC surface exposes: per-user sync, per-user
//! verification, fleet-wide sync batches, and fleet health sweeps.

pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sync;

pub use config::{Environment, ServiceConfig, NOTIFY_SEED_ENV};
pub use error::ServiceError;
pub use metrics::SyncMetrics;
pub use report::{BatchFailure, BatchReport, SkipReason, SweepReport, SyncOutcome};
pub use runner::UserTaskRunner;
pub use sync::SyncService;
