//! Status enums for accounts and diffs.

use serde::{Deserialize, Serialize};

/// The standing of a user's profile service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileStatus {
    /// Service ownership proven via chaincode challenge; eligible for sync.
    #[serde(rename = "VERIFIED")]
    Verified,
    /// Awaiting a first successful verification.
    #[serde(rename = "PENDING")]
    Pending,
    /// Service failed verification, went down, or served bad data.
    #[serde(rename = "BLOCKED")]
    Blocked,
}

impl ProfileStatus {
    /// Whether accounts in this status are picked up by sync runs and
    /// health sweeps.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Pending => "PENDING",
            Self::Blocked => "BLOCKED",
        }
    }
}

/// Review state of a stored diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalState {
    /// Waiting for human review.
    #[serde(rename = "PENDING")]
    Pending,
    /// Superseded by a newer diff, or rejected by a reviewer
    /// (`"NOT APPROVED"` on the wire).
    #[serde(rename = "NOT APPROVED")]
    NotApproved,
    /// Promoted to canonical by the review tool. Written by the reviewer
    /// side, never by this service; modeled so stored diffs round-trip.
    #[serde(rename = "APPROVED")]
    Approved,
}

impl ApprovalState {
    /// Whether a diff in this state still awaits review.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::NotApproved => "NOT APPROVED",
            Self::Approved => "APPROVED",
        }
    }
}
