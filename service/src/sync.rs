//! The sync pipeline, verification entry point, and batch runs.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use tokio::task::JoinSet;

use idsync_chaincode::{ChaincodeVerifier, VerificationStatus};
use idsync_client::{ClientError, ProfileServiceClient};
use idsync_notify::NotifyClient;
use idsync_reconcile::{validate_profile, Reconciler};
use idsync_store::{
    AuditEntry, AuditKind, AuditMeta, AuditStore, DiffStore, UserAccount, UserStore,
};
use idsync_types::{ProfileStatus, SessionId, Timestamp, UserId};

use crate::config::ServiceConfig;
use crate::metrics::SyncMetrics;
use crate::report::{BatchReport, SkipReason, SweepReport, SyncOutcome};
use crate::runner::UserTaskRunner;
use crate::ServiceError;

/// The service behind every invocation: per-user sync, chaincode
/// verification, fleet-wide sync batches, and health sweeps.
///
/// One instance is shared across the RPC handlers via `Arc`. All state
/// lives in the store; the service itself only carries clients, config,
/// and metrics.
pub struct SyncService<S> {
    store: Arc<S>,
    reconciler: Reconciler<S>,
    verifier: ChaincodeVerifier,
    /// Short-budget client for `GET /health` pings.
    health_client: ProfileServiceClient,
    /// Longer-budget client for `GET /profile` fetches.
    fetch_client: ProfileServiceClient,
    /// Client for `POST /verification` challenge rounds.
    challenge_client: ProfileServiceClient,
    notifier: Option<Arc<NotifyClient>>,
    runner: UserTaskRunner,
    metrics: Arc<SyncMetrics>,
    config: Arc<ServiceConfig>,
}

impl<S> SyncService<S>
where
    S: UserStore + DiffStore + AuditStore + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<S>,
        config: Arc<ServiceConfig>,
        metrics: Arc<SyncMetrics>,
        notifier: Option<Arc<NotifyClient>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            reconciler: Reconciler::new(store.clone()),
            verifier: ChaincodeVerifier::new(),
            health_client: ProfileServiceClient::with_timeout(config.health_timeout()),
            fetch_client: ProfileServiceClient::with_timeout(config.fetch_timeout()),
            challenge_client: ProfileServiceClient::with_timeout(config.challenge_timeout()),
            notifier,
            runner: UserTaskRunner::new(config.max_concurrent_syncs),
            metrics,
            store,
            config,
        })
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ── Per-user sync ───────────────────────────────────────────────────

    /// Run one user's sync pass under that user's logical lock.
    ///
    /// Concurrent duplicate triggers for the same user serialize here, so
    /// the retire-then-stage write order inside the reconciler can never
    /// interleave.
    pub async fn sync_user(
        &self,
        user_id: &UserId,
        session: Option<&SessionId>,
    ) -> Result<SyncOutcome, ServiceError> {
        let started = Instant::now();
        let result = self
            .runner
            .run(user_id, self.sync_user_locked(user_id, session))
            .await;
        self.metrics
            .sync_duration_ms
            .observe(started.elapsed().as_millis() as f64);
        result
    }

    async fn sync_user_locked(
        &self,
        user_id: &UserId,
        session: Option<&SessionId>,
    ) -> Result<SyncOutcome, ServiceError> {
        let account = self.store.get_user(user_id)?;

        let Some(profile_url) = account
            .profile_url
            .clone()
            .filter(|url| !url.is_empty())
        else {
            return self.skip(&account, SkipReason::NoProfileUrl, true, session).await;
        };

        let Some(chaincode) = account.active_chaincode().map(str::to_owned) else {
            return self
                .skip(&account, SkipReason::MissingChaincode, true, session)
                .await;
        };

        let service_running = self.health_client.health(&profile_url).await.is_ok();
        self.audit(
            AuditKind::ProfileServiceHealth,
            &account.id,
            session,
            serde_json::json!({
                "userId": account.id,
                "serviceRunning": service_running,
            }),
        );
        if !service_running {
            self.metrics.health_probe_failures.inc();
            return self.skip(&account, SkipReason::ServiceDown, true, session).await;
        }

        let bearer = match chaincode_bearer(&chaincode) {
            Ok(bearer) => bearer,
            Err(e) => {
                self.block_account(&account, "chaincode could not be hashed", session)
                    .await?;
                return Err(e);
            }
        };

        let fetched = match self.fetch_client.fetch_profile(&profile_url, &bearer).await {
            Ok(profile) => profile,
            Err(ClientError::Unauthenticated(_)) => {
                return self
                    .skip(&account, SkipReason::UnauthenticatedAccess, true, session)
                    .await;
            }
            Err(ClientError::InvalidResponse(e)) => {
                return self
                    .skip(&account, SkipReason::BadProfileData(e), true, session)
                    .await;
            }
            Err(e) => {
                return self
                    .skip(&account, SkipReason::FetchFailed(e.to_string()), true, session)
                    .await;
            }
        };

        if let Err(e) = validate_profile(&fetched) {
            let block = self.config.block_on_validation_failure;
            return self
                .skip(
                    &account,
                    SkipReason::ValidationFailed(e.to_string()),
                    block,
                    session,
                )
                .await;
        }

        let outcome = self
            .reconciler
            .run(
                &account.id,
                &account.profile,
                &fetched,
                session,
                Timestamp::now(),
            )
            .map_err(|e| {
                self.metrics.store_write_failures.inc();
                e
            })?;

        self.metrics.profiles_synced.inc();
        if outcome.stored.is_some() {
            self.metrics.diffs_stored.inc();
        } else {
            self.metrics.profiles_skipped.inc();
        }
        Ok(SyncOutcome::Reconciled(outcome))
    }

    // ── Verification ────────────────────────────────────────────────────

    /// Run the chaincode challenge for one user and persist the verdict.
    pub async fn verify_user(
        &self,
        user_id: &UserId,
    ) -> Result<VerificationStatus, ServiceError> {
        let account = self.store.get_user(user_id)?;

        if account.profile_status == ProfileStatus::Verified {
            return Err(ServiceError::AlreadyVerified);
        }

        let Some(profile_url) = account
            .profile_url
            .clone()
            .filter(|url| !url.is_empty())
        else {
            self.audit_verification_refused(&account, "no profile URL on file");
            return Err(ServiceError::NotVerifiable("no profile URL on file".into()));
        };
        let Some(chaincode) = account.active_chaincode().map(str::to_owned) else {
            self.audit_verification_refused(&account, "no chaincode on file");
            return Err(ServiceError::NotVerifiable("no chaincode on file".into()));
        };

        self.metrics.verifications.inc();
        match self
            .verifier
            .verify(&self.challenge_client, &profile_url, &chaincode)
            .await
        {
            Ok(status) => {
                self.persist_verdict(&account, status, None).await?;
                Ok(status)
            }
            Err(e) => {
                // No usable answer arrived; the account is blocked and the
                // transport failure still surfaces to the caller.
                self.persist_verdict(&account, VerificationStatus::Blocked, None)
                    .await?;
                Err(e.into())
            }
        }
    }

    async fn persist_verdict(
        &self,
        account: &UserAccount,
        status: VerificationStatus,
        session: Option<&SessionId>,
    ) -> Result<(), ServiceError> {
        let kind = match status {
            VerificationStatus::Verified => AuditKind::ProfileVerified,
            VerificationStatus::Blocked => {
                self.metrics.verifications_blocked.inc();
                AuditKind::ProfileBlocked
            }
        };
        self.audit(
            kind,
            &account.id,
            session,
            serde_json::json!({
                "userId": account.id,
                "profileURL": account.profile_url,
                "status": status.as_str(),
            }),
        );
        tracing::info!(user = %account.id, status = status.as_str(), "challenge verdict");

        self.store
            .set_profile_status(&account.id, status.as_profile_status(), Timestamp::now())
            .map_err(|e| {
                self.metrics.store_write_failures.inc();
                e
            })?;
        if status == VerificationStatus::Blocked {
            self.metrics.accounts_blocked.inc();
            self.notify_blocked(account, "Chaincode verification failed").await;
        }
        Ok(())
    }

    fn audit_verification_refused(&self, account: &UserAccount, why: &str) {
        self.audit(
            AuditKind::VerificationBlocked,
            &account.id,
            None,
            serde_json::json!({
                "userId": account.id,
                "reason": why,
            }),
        );
    }

    // ── Batch runs ──────────────────────────────────────────────────────

    /// Sync every VERIFIED account, bounded by the configured concurrency
    /// and batch deadline, and aggregate per-user results into a report.
    pub async fn sync_all(
        self: &Arc<Self>,
        session: Option<SessionId>,
    ) -> Result<BatchReport, ServiceError> {
        let session = session.unwrap_or_else(SessionId::generate);
        let users = self.store.iter_verified_users()?;
        tracing::info!(session = %session, users = users.len(), "starting sync batch");

        let report = Arc::new(Mutex::new(BatchReport::new(session.clone(), users.len())));
        let mut tasks = JoinSet::new();
        for account in users {
            let service = Arc::clone(self);
            let report = Arc::clone(&report);
            let session = session.clone();
            tasks.spawn(async move {
                let result = service.sync_user(&account.id, Some(&session)).await;
                if let Err(e) = &result {
                    tracing::warn!(user = %account.id, error = %e, "sync pass failed");
                }
                report
                    .lock()
                    .expect("report lock is never poisoned")
                    .record(&account.username, &result);
            });
        }
        self.drain_with_deadline(&mut tasks).await;
        self.runner.cleanup().await;
        self.refresh_gauges();

        let mut report = report
            .lock()
            .expect("report lock is never poisoned")
            .clone();
        report.deadline_missed = report.total.saturating_sub(report.recorded());
        if report.deadline_missed > 0 {
            tracing::warn!(
                session = %report.session_id,
                missed = report.deadline_missed,
                "batch deadline cut off unfinished sync passes"
            );
        }
        Ok(report)
    }

    /// Probe every VERIFIED account's `/health` endpoint; block the ones
    /// that are down.
    pub async fn health_sweep(
        self: &Arc<Self>,
        session: Option<SessionId>,
    ) -> Result<SweepReport, ServiceError> {
        let session = session.unwrap_or_else(SessionId::generate);
        let users = self.store.iter_verified_users()?;
        tracing::info!(session = %session, users = users.len(), "starting health sweep");

        let report = Arc::new(Mutex::new(SweepReport::new(session.clone())));
        let mut probed = 0usize;
        let mut tasks = JoinSet::new();
        for account in users {
            let Some(url) = account.profile_url.clone().filter(|u| !u.is_empty()) else {
                continue;
            };
            probed += 1;
            let service = Arc::clone(self);
            let report = Arc::clone(&report);
            let session = session.clone();
            tasks.spawn(async move {
                let result = service.probe_user(&account, &url, &session).await;
                let mut report = report.lock().expect("report lock is never poisoned");
                match result {
                    Ok(true) => report.healthy += 1,
                    Ok(false) => report.blocked.push(account.username.clone()),
                    Err(e) => report.failures.push(crate::report::BatchFailure {
                        username: account.username.clone(),
                        message: e.to_string(),
                    }),
                }
            });
        }
        self.drain_with_deadline(&mut tasks).await;
        self.runner.cleanup().await;
        self.refresh_gauges();

        let mut report = report
            .lock()
            .expect("report lock is never poisoned")
            .clone();
        report.probed = probed;
        report.deadline_missed = probed
            .saturating_sub(report.healthy + report.blocked.len() + report.failures.len());
        Ok(report)
    }

    /// Probe one service. `Ok(true)` means healthy; `Ok(false)` means down
    /// and the account is now blocked.
    async fn probe_user(
        &self,
        account: &UserAccount,
        url: &str,
        session: &SessionId,
    ) -> Result<bool, ServiceError> {
        let lock_target = account.id.clone();
        self.runner
            .run(&lock_target, async {
                let service_running = self.health_client.health(url).await.is_ok();
                self.audit(
                    AuditKind::ProfileServiceHealth,
                    &account.id,
                    Some(session),
                    serde_json::json!({
                        "userId": account.id,
                        "serviceRunning": service_running,
                    }),
                );
                if service_running {
                    return Ok(true);
                }
                self.metrics.health_probe_failures.inc();
                self.block_account(account, "Profile Service Down", Some(session))
                    .await?;
                Ok(false)
            })
            .await
    }

    /// Wait for all spawned tasks, cutting the batch off at the deadline.
    async fn drain_with_deadline(&self, tasks: &mut JoinSet<()>) {
        let deadline = tokio::time::Instant::now() + self.config.batch_deadline();
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(None) => break,
                Ok(Some(Ok(()))) => {}
                Ok(Some(Err(e))) => {
                    tracing::warn!(error = %e, "batch task panicked or was aborted");
                }
                Err(_) => {
                    tasks.abort_all();
                    break;
                }
            }
        }
    }

    // ── Shared side effects ─────────────────────────────────────────────

    async fn skip(
        &self,
        account: &UserAccount,
        reason: SkipReason,
        block: bool,
        session: Option<&SessionId>,
    ) -> Result<SyncOutcome, ServiceError> {
        let why = reason.audit_reason();
        tracing::info!(user = %account.id, reason = %why, "sync pass skipped");
        self.metrics.profiles_skipped.inc();
        self.audit(
            AuditKind::ProfileSkipped,
            &account.id,
            session,
            serde_json::json!({
                "userId": account.id,
                "reason": why,
            }),
        );
        if block {
            self.block_account(account, &why, session).await?;
        }
        Ok(SyncOutcome::Skipped(reason))
    }

    /// Block the account: status write (must succeed), audit entry and
    /// notification (best-effort).
    async fn block_account(
        &self,
        account: &UserAccount,
        reason: &str,
        session: Option<&SessionId>,
    ) -> Result<(), ServiceError> {
        self.store
            .set_profile_status(&account.id, ProfileStatus::Blocked, Timestamp::now())
            .map_err(|e| {
                self.metrics.store_write_failures.inc();
                e
            })?;
        self.metrics.accounts_blocked.inc();
        self.audit(
            AuditKind::ProfileServiceBlocked,
            &account.id,
            session,
            serde_json::json!({
                "userId": account.id,
                "reason": reason,
            }),
        );
        self.notify_blocked(account, reason).await;
        Ok(())
    }

    async fn notify_blocked(&self, account: &UserAccount, reason: &str) {
        let (Some(notifier), Some(discord_id)) =
            (self.notifier.as_ref(), account.discord_id.as_deref())
        else {
            return;
        };
        if let Err(e) = notifier.profile_blocked(discord_id, reason).await {
            tracing::warn!(user = %account.id, error = %e, "blocked notification failed");
        }
    }

    /// Best-effort audit append; failures must never mask state writes.
    fn audit(
        &self,
        kind: AuditKind,
        user: &UserId,
        session: Option<&SessionId>,
        body: serde_json::Value,
    ) {
        let entry = AuditEntry::new(
            kind,
            Timestamp::now(),
            AuditMeta::for_user(user.clone(), session.cloned()),
            body,
        );
        if let Err(e) = self.store.append(&entry) {
            tracing::warn!(user = %user, kind = kind.as_str(), error = %e, "audit append failed");
        }
    }

    fn refresh_gauges(&self) {
        if let Ok(users) = self.store.user_count() {
            self.metrics.users_total.set(users as i64);
        }
        if let Ok(diffs) = self.store.diff_count() {
            self.metrics.diffs_total.set(diffs as i64);
        }
    }
}

/// Bearer sent on `GET /profile`: an Argon2id hash of the chaincode in PHC
/// string form. The remote service verifies it against the chaincode it
/// was provisioned with; the secret itself stays off the wire.
fn chaincode_bearer(chaincode: &str) -> Result<String, ServiceError> {
    let mut raw = [0u8; 16];
    getrandom::getrandom(&mut raw)
        .map_err(|e| ServiceError::Hashing(format!("salt generation failed: {e}")))?;
    let salt =
        SaltString::encode_b64(&raw).map_err(|e| ServiceError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(chaincode.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Hashing(e.to_string()))
}
