//! Prometheus metrics for the idsync service.
//!
//! The [`SyncMetrics`] struct owns a dedicated [`Registry`] that the RPC
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Histogram, HistogramOpts, IntCounter, IntGauge, Opts,
    Registry,
};

/// Central collection of all service-level Prometheus metrics.
pub struct SyncMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Total per-user sync passes that ran to a decision.
    pub profiles_synced: IntCounter,
    /// Total new diffs staged for review.
    pub diffs_stored: IntCounter,
    /// Total sync passes that ended in a skip.
    pub profiles_skipped: IntCounter,
    /// Total accounts transitioned to BLOCKED, for any reason.
    pub accounts_blocked: IntCounter,
    /// Total chaincode challenge rounds attempted.
    pub verifications: IntCounter,
    /// Total challenge rounds that ended BLOCKED.
    pub verifications_blocked: IntCounter,
    /// Total health probes that found a service down.
    pub health_probe_failures: IntCounter,
    /// Total correctness-critical store writes that failed.
    pub store_write_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current number of user accounts in the store.
    pub users_total: IntGauge,
    /// Current number of stored diffs.
    pub diffs_total: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall-clock time of one per-user sync pass, in milliseconds.
    pub sync_duration_ms: Histogram,
}

impl SyncMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let profiles_synced = register_int_counter_with_registry!(
            Opts::new(
                "idsync_profiles_synced_total",
                "Total per-user sync passes that reached a decision"
            ),
            registry
        )
        .expect("failed to register profiles_synced counter");

        let diffs_stored = register_int_counter_with_registry!(
            Opts::new("idsync_diffs_stored_total", "Total new diffs staged"),
            registry
        )
        .expect("failed to register diffs_stored counter");

        let profiles_skipped = register_int_counter_with_registry!(
            Opts::new(
                "idsync_profiles_skipped_total",
                "Total sync passes that ended in a skip"
            ),
            registry
        )
        .expect("failed to register profiles_skipped counter");

        let accounts_blocked = register_int_counter_with_registry!(
            Opts::new(
                "idsync_accounts_blocked_total",
                "Total accounts transitioned to BLOCKED"
            ),
            registry
        )
        .expect("failed to register accounts_blocked counter");

        let verifications = register_int_counter_with_registry!(
            Opts::new(
                "idsync_verifications_total",
                "Total chaincode challenge rounds attempted"
            ),
            registry
        )
        .expect("failed to register verifications counter");

        let verifications_blocked = register_int_counter_with_registry!(
            Opts::new(
                "idsync_verifications_blocked_total",
                "Total challenge rounds that ended BLOCKED"
            ),
            registry
        )
        .expect("failed to register verifications_blocked counter");

        let health_probe_failures = register_int_counter_with_registry!(
            Opts::new(
                "idsync_health_probe_failures_total",
                "Total health probes that found a service down"
            ),
            registry
        )
        .expect("failed to register health_probe_failures counter");

        let store_write_failures = register_int_counter_with_registry!(
            Opts::new(
                "idsync_store_write_failures_total",
                "Total correctness-critical store writes that failed"
            ),
            registry
        )
        .expect("failed to register store_write_failures counter");

        let users_total = register_int_gauge_with_registry!(
            Opts::new("idsync_users_total", "Current number of user accounts"),
            registry
        )
        .expect("failed to register users_total gauge");

        let diffs_total = register_int_gauge_with_registry!(
            Opts::new("idsync_diffs_total", "Current number of stored diffs"),
            registry
        )
        .expect("failed to register diffs_total gauge");

        // Exponential buckets covering 1 ms → ~16 s; a sync pass is two
        // remote calls plus store writes.
        let sync_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "idsync_sync_duration_ms",
                "Per-user sync pass duration in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register sync_duration_ms histogram");

        Self {
            registry,
            profiles_synced,
            diffs_stored,
            profiles_skipped,
            accounts_blocked,
            verifications,
            verifications_blocked,
            health_probe_failures,
            store_write_failures,
            users_total,
            diffs_total,
            sync_duration_ms,
        }
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}
