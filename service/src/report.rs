//! Outcomes of sync passes and aggregated batch reports.

use idsync_reconcile::{Decision, ReconcileOutcome};
use idsync_types::SessionId;
use serde::Serialize;

use crate::ServiceError;

/// Why a sync pass ended without reconciling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The account has no profile URL on file.
    NoProfileUrl,
    /// The chaincode is missing or was cleared by an earlier block.
    MissingChaincode,
    /// The service failed its health ping.
    ServiceDown,
    /// The service rejected our bearer on `GET /profile`.
    UnauthenticatedAccess,
    /// The fetch failed some other way (bad status, transport).
    FetchFailed(String),
    /// The profile body did not parse.
    BadProfileData(String),
    /// The profile parsed but failed field validation.
    ValidationFailed(String),
}

impl SkipReason {
    /// The reason string recorded in audit entries and notifications.
    pub fn audit_reason(&self) -> String {
        match self {
            Self::NoProfileUrl => "Profile URL not available".into(),
            Self::MissingChaincode => {
                "Profile Service Blocked or Chaincode is empty".into()
            }
            Self::ServiceDown => "Profile Service Down".into(),
            Self::UnauthenticatedAccess => {
                "Unauthenticated Access to Profile Data".into()
            }
            Self::FetchFailed(e) => format!("Error in getting Profile Data: {e}"),
            Self::BadProfileData(e) => format!("Profile Data is malformed: {e}"),
            Self::ValidationFailed(e) => format!("Validation failed: {e}"),
        }
    }
}

/// Result of one per-user sync pass.
#[derive(Clone, Debug)]
pub enum SyncOutcome {
    /// The pipeline ran to a reconciliation decision.
    Reconciled(ReconcileOutcome),
    /// The pass stopped before reconciliation.
    Skipped(SkipReason),
}

impl SyncOutcome {
    /// Human-readable status line returned by the invocation surface.
    pub fn status_message(&self) -> String {
        match self {
            Self::Reconciled(outcome) => match outcome.decision {
                Decision::StoreNewDiff => "Profile Saved".into(),
                _ => format!("Profile Skipped: {}", outcome.decision.as_str()),
            },
            Self::Skipped(reason) => format!("Profile Skipped: {}", reason.audit_reason()),
        }
    }
}

/// One failed user in a batch.
#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
    pub username: String,
    pub message: String,
}

/// Aggregated result of a sync-all invocation. Usernames are bucketed by
/// outcome so the report reads like the run's worksheet.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub session_id: SessionId,
    /// Verified accounts picked up by this run.
    pub total: usize,
    pub stored: Vec<String>,
    pub same_as_canonical: Vec<String>,
    pub same_as_pending: Vec<String>,
    pub same_as_last_rejected: Vec<String>,
    pub no_profile_url: Vec<String>,
    pub missing_chaincode: Vec<String>,
    pub service_down: Vec<String>,
    pub unauthenticated: Vec<String>,
    pub fetch_failed: Vec<String>,
    pub bad_profile_data: Vec<String>,
    pub validation_failed: Vec<String>,
    pub errors: Vec<BatchFailure>,
    /// Users whose task never finished before the batch deadline.
    pub deadline_missed: usize,
}

impl BatchReport {
    pub fn new(session_id: SessionId, total: usize) -> Self {
        Self {
            session_id,
            total,
            stored: Vec::new(),
            same_as_canonical: Vec::new(),
            same_as_pending: Vec::new(),
            same_as_last_rejected: Vec::new(),
            no_profile_url: Vec::new(),
            missing_chaincode: Vec::new(),
            service_down: Vec::new(),
            unauthenticated: Vec::new(),
            fetch_failed: Vec::new(),
            bad_profile_data: Vec::new(),
            validation_failed: Vec::new(),
            errors: Vec::new(),
            deadline_missed: 0,
        }
    }

    /// File one user's result into its bucket.
    pub fn record(&mut self, username: &str, result: &Result<SyncOutcome, ServiceError>) {
        let username = username.to_string();
        match result {
            Ok(SyncOutcome::Reconciled(outcome)) => match outcome.decision {
                Decision::StoreNewDiff => self.stored.push(username),
                Decision::SameAsCanonical => self.same_as_canonical.push(username),
                Decision::SameAsPending => self.same_as_pending.push(username),
                Decision::SameAsLastRejected => {
                    self.same_as_last_rejected.push(username)
                }
            },
            Ok(SyncOutcome::Skipped(reason)) => match reason {
                SkipReason::NoProfileUrl => self.no_profile_url.push(username),
                SkipReason::MissingChaincode => self.missing_chaincode.push(username),
                SkipReason::ServiceDown => self.service_down.push(username),
                SkipReason::UnauthenticatedAccess => self.unauthenticated.push(username),
                SkipReason::FetchFailed(_) => self.fetch_failed.push(username),
                SkipReason::BadProfileData(_) => self.bad_profile_data.push(username),
                SkipReason::ValidationFailed(_) => self.validation_failed.push(username),
            },
            Err(e) => self.errors.push(BatchFailure {
                username,
                message: e.to_string(),
            }),
        }
    }

    /// How many users have a recorded outcome so far.
    pub fn recorded(&self) -> usize {
        self.stored.len()
            + self.same_as_canonical.len()
            + self.same_as_pending.len()
            + self.same_as_last_rejected.len()
            + self.no_profile_url.len()
            + self.missing_chaincode.len()
            + self.service_down.len()
            + self.unauthenticated.len()
            + self.fetch_failed.len()
            + self.bad_profile_data.len()
            + self.validation_failed.len()
            + self.errors.len()
    }
}

/// Aggregated result of a fleet health sweep.
#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
    pub session_id: SessionId,
    /// Accounts whose service was actually probed (VERIFIED with a URL).
    pub probed: usize,
    pub healthy: usize,
    pub blocked: Vec<String>,
    pub failures: Vec<BatchFailure>,
    /// Users whose probe never finished before the batch deadline.
    pub deadline_missed: usize,
}

impl SweepReport {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            probed: 0,
            healthy: 0,
            blocked: Vec::new(),
            failures: Vec::new(),
            deadline_missed: 0,
        }
    }
}
