//! Append-only audit log trait.

use crate::StoreError;
use idsync_types::{SessionId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// What a single audit entry records.
///
/// Wire strings match the log types the review tooling already queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditKind {
    /// Result of a health ping against a user's profile service.
    #[serde(rename = "PROFILE_SERVICE_HEALTH")]
    ProfileServiceHealth,
    /// A sync pass ended without storing anything, and why.
    #[serde(rename = "PROFILE_SKIPPED")]
    ProfileSkipped,
    /// A new PENDING diff was persisted.
    #[serde(rename = "PROFILE_DIFF_STORED")]
    ProfileDiffStored,
    /// An account was blocked because its service failed.
    #[serde(rename = "PROFILE_SERVICE_BLOCKED")]
    ProfileServiceBlocked,
    /// A chaincode challenge succeeded.
    #[serde(rename = "PROFILE_VERIFIED")]
    ProfileVerified,
    /// A chaincode challenge failed.
    #[serde(rename = "PROFILE_BLOCKED")]
    ProfileBlocked,
    /// Verification was refused before a challenge was ever issued
    /// (missing or cleared chaincode).
    #[serde(rename = "VERIFICATION_BLOCKED")]
    VerificationBlocked,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileServiceHealth => "PROFILE_SERVICE_HEALTH",
            Self::ProfileSkipped => "PROFILE_SKIPPED",
            Self::ProfileDiffStored => "PROFILE_DIFF_STORED",
            Self::ProfileServiceBlocked => "PROFILE_SERVICE_BLOCKED",
            Self::ProfileVerified => "PROFILE_VERIFIED",
            Self::ProfileBlocked => "PROFILE_BLOCKED",
            Self::VerificationBlocked => "VERIFICATION_BLOCKED",
        }
    }
}

/// Correlation context attached to every audit entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl AuditMeta {
    pub fn for_user(user_id: UserId, session_id: Option<SessionId>) -> Self {
        Self {
            user_id: Some(user_id),
            session_id,
        }
    }
}

/// One append-only audit record.
///
/// Written as a side effect of nearly every decision the service makes and
/// never read back by the service itself; the review tooling consumes them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    pub kind: AuditKind,
    pub at: Timestamp,
    pub meta: AuditMeta,
    /// Free-form payload, shaped per kind.
    pub body: serde_json::Value,
}

impl AuditEntry {
    pub fn new(kind: AuditKind, at: Timestamp, meta: AuditMeta, body: serde_json::Value) -> Self {
        Self {
            kind,
            at,
            meta,
            body,
        }
    }
}

/// Trait for audit log storage.
pub trait AuditStore {
    /// Append one entry. Appends never overwrite or delete.
    fn append(&self, entry: &AuditEntry) -> Result<(), StoreError>;

    fn entry_count(&self) -> Result<u64, StoreError>;
}
