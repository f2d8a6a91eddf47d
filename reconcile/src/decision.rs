//! The pure reconciliation decision.

use idsync_types::ProfileRecord;

/// What a reconciliation pass decided to do with a fetched profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The fetched profile is genuinely new: stage it as a PENDING diff.
    StoreNewDiff,
    /// Identical to the stored canonical profile; nothing changed.
    SameAsCanonical,
    /// Identical to the diff already awaiting review; do not duplicate it.
    SameAsPending,
    /// Identical to a profile a reviewer already rejected; do not resubmit.
    SameAsLastRejected,
}

impl Decision {
    /// The skip reason recorded in the audit log. `StoreNewDiff` is not a
    /// skip and carries no reason.
    pub fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::StoreNewDiff => None,
            Self::SameAsCanonical => Some("Current User Data is same as New Profile Data"),
            Self::SameAsPending => Some("Last Pending Diff is same as New Profile Data"),
            Self::SameAsLastRejected => {
                Some("Last Rejected Diff is same as New Profile Data")
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StoreNewDiff => "stored",
            Self::SameAsCanonical => "same_as_canonical",
            Self::SameAsPending => "same_as_pending",
            Self::SameAsLastRejected => "same_as_last_rejected",
        }
    }
}

/// Decide what to do with `fetched`.
///
/// Equality is exact, field by field: any single-field change, whitespace
/// included, is a change a reviewer must see.
///
/// The rejected-diff lookup is lazy: it runs only when `fetched` already
/// differs from both the canonical profile and the pending diff, which is
/// the only branch whose outcome depends on it. Its error type is the
/// caller's; [`crate::Reconciler`] passes a store query that retires the
/// outstanding pending diff before reading, tests pass `Ok`-wrapped
/// fixtures.
pub fn decide<E>(
    fetched: &ProfileRecord,
    canonical: &ProfileRecord,
    last_pending: Option<&ProfileRecord>,
    last_rejected: impl FnOnce() -> Result<Option<ProfileRecord>, E>,
) -> Result<Decision, E> {
    if fetched == canonical {
        return Ok(Decision::SameAsCanonical);
    }
    if last_pending == Some(fetched) {
        return Ok(Decision::SameAsPending);
    }
    match last_rejected()? {
        Some(rejected) if rejected == *fetched => Ok(Decision::SameAsLastRejected),
        _ => Ok(Decision::StoreNewDiff),
    }
}
