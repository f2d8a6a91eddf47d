//! The store-coupled reconciliation runner.

use std::sync::Arc;

use idsync_store::{AuditEntry, AuditKind, AuditMeta, AuditStore, DiffRecord, DiffStore};
use idsync_types::{ApprovalState, DiffId, ProfileRecord, SessionId, Timestamp, UserId};

use crate::decision::{decide, Decision};
use crate::ReconcileError;

/// What one reconciliation pass did.
#[derive(Clone, Debug)]
pub struct ReconcileOutcome {
    pub decision: Decision,
    /// Id of the newly staged diff, on the [`Decision::StoreNewDiff`] path.
    pub stored: Option<DiffId>,
    /// Id of the pending diff this pass retired to NOT APPROVED, if any.
    pub resolved: Option<DiffId>,
}

/// Applies [`decide`] against the stores.
///
/// Diff writes and approval transitions are correctness-critical and
/// propagate failure; audit appends are best-effort and only logged. The
/// caller serializes concurrent passes for the same user — within one pass
/// the pending diff is always retired before a new one is staged, which is
/// what keeps at most one diff PENDING per user.
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S> Reconciler<S>
where
    S: DiffStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Reconcile `fetched` against `canonical` and the user's staged diffs.
    pub fn run(
        &self,
        owner: &UserId,
        canonical: &ProfileRecord,
        fetched: &ProfileRecord,
        session: Option<&SessionId>,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let last_pending = self.store.latest_for_user(owner, ApprovalState::Pending)?;
        let pending_id = last_pending.as_ref().map(|(id, _)| id.clone());
        let pending_profile = last_pending.map(|(_, record)| record.profile);

        // The rejected lookup retires the outstanding pending diff before
        // reading the NOT APPROVED history. When a pending diff existed it
        // is therefore the newest rejected diff the comparison sees, and
        // any older rejection no longer suppresses a resubmission.
        let mut resolved = None;
        let decision = decide(
            fetched,
            canonical,
            pending_profile.as_ref(),
            || -> Result<Option<ProfileRecord>, ReconcileError> {
                resolved = self.retire_pending(owner, pending_id.as_ref())?;
                Ok(self
                    .store
                    .latest_for_user(owner, ApprovalState::NotApproved)?
                    .map(|(_, record)| record.profile))
            },
        )?;

        let mut outcome = ReconcileOutcome {
            decision,
            stored: None,
            resolved,
        };

        match decision {
            Decision::SameAsPending => {
                tracing::debug!(user = %owner, "fetched profile already awaiting review");
                return Ok(outcome);
            }
            Decision::SameAsCanonical => {
                outcome.resolved = self.retire_pending(owner, pending_id.as_ref())?;
                self.audit_skip(owner, decision, session, now);
            }
            Decision::SameAsLastRejected => {
                self.audit_skip(owner, decision, session, now);
            }
            Decision::StoreNewDiff => {
                let record = DiffRecord::pending(owner.clone(), fetched.clone(), now);
                let diff_id = self.store.add_diff(&record)?;
                tracing::info!(user = %owner, diff = %diff_id, "staged new profile diff");
                self.audit(
                    AuditKind::ProfileDiffStored,
                    owner,
                    session,
                    now,
                    serde_json::json!({
                        "userId": owner,
                        "diffId": diff_id,
                    }),
                );
                outcome.stored = Some(diff_id);
            }
        }

        Ok(outcome)
    }

    /// Retire an outstanding pending diff to NOT APPROVED.
    fn retire_pending(
        &self,
        owner: &UserId,
        pending_id: Option<&DiffId>,
    ) -> Result<Option<DiffId>, ReconcileError> {
        let Some(diff_id) = pending_id else {
            return Ok(None);
        };
        self.store
            .set_approval(diff_id, ApprovalState::NotApproved)?;
        tracing::debug!(user = %owner, diff = %diff_id, "retired stale pending diff");
        Ok(Some(diff_id.clone()))
    }

    fn audit_skip(
        &self,
        owner: &UserId,
        decision: Decision,
        session: Option<&SessionId>,
        now: Timestamp,
    ) {
        let reason = decision
            .skip_reason()
            .unwrap_or("skipped for an unrecorded reason");
        self.audit(
            AuditKind::ProfileSkipped,
            owner,
            session,
            now,
            serde_json::json!({
                "userId": owner,
                "reason": reason,
            }),
        );
    }

    /// Best-effort audit append; a failed append must never mask the state
    /// writes this pass already made.
    fn audit(
        &self,
        kind: AuditKind,
        owner: &UserId,
        session: Option<&SessionId>,
        now: Timestamp,
        body: serde_json::Value,
    ) {
        let entry = AuditEntry::new(
            kind,
            now,
            AuditMeta::for_user(owner.clone(), session.cloned()),
            body,
        );
        if let Err(e) = self.store.append(&entry) {
            tracing::warn!(user = %owner, kind = kind.as_str(), error = %e, "audit append failed");
        }
    }
}
