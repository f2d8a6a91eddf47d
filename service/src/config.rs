//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ServiceError;

/// Environment variable holding the notify signing seed in DEVELOPMENT.
pub const NOTIFY_SEED_ENV: &str = "IDSYNC_NOTIFY_SIGNING_KEY";

/// Where secret material comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Secrets read straight from environment variables.
    #[default]
    #[serde(rename = "DEVELOPMENT")]
    Development,
    /// Secrets read from files provisioned by the deployment.
    #[serde(rename = "PRODUCTION")]
    Production,
}

/// Configuration for the idsync service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Which secret-resolution scheme to use.
    #[serde(default)]
    pub environment: Environment,

    /// Address the RPC server binds.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the notification bot. Unset disables notifications.
    #[serde(default)]
    pub notify_base_url: Option<String>,

    /// Path to the 32-byte hex seed for the webhook signing key
    /// (PRODUCTION only; DEVELOPMENT reads `IDSYNC_NOTIFY_SIGNING_KEY`).
    #[serde(default)]
    pub notify_signing_key_file: Option<PathBuf>,

    /// Timeout for `GET /health` pings against profile services.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// Timeout for `GET /profile` fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for `POST /verification` challenge rounds.
    #[serde(default = "default_challenge_timeout_secs")]
    pub challenge_timeout_secs: u64,

    /// Upper bound on concurrently syncing users.
    #[serde(default = "default_max_concurrent_syncs")]
    pub max_concurrent_syncs: usize,

    /// Wall-clock budget for one batch invocation (sync-all, sweep).
    #[serde(default = "default_batch_deadline_secs")]
    pub batch_deadline_secs: u64,

    /// Whether a profile that fails validation blocks the account.
    #[serde(default = "default_true")]
    pub block_on_validation_failure: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:7080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./idsync_data")
}

fn default_health_timeout_secs() -> u64 {
    5
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_challenge_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_syncs() -> usize {
    8
}

fn default_batch_deadline_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ServiceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_secs(self.challenge_timeout_secs)
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_secs(self.batch_deadline_secs)
    }

    /// Resolve the hex seed for the webhook signing key, per environment.
    ///
    /// Returns `Ok(None)` when notifications are disabled (`notify_base_url`
    /// unset). With notifications enabled, a missing seed is a
    /// configuration error: silently unsigned webhooks are worse than a
    /// failed startup.
    pub fn resolve_notify_seed(&self) -> Result<Option<String>, ServiceError> {
        if self.notify_base_url.is_none() {
            return Ok(None);
        }
        match self.environment {
            Environment::Development => std::env::var(NOTIFY_SEED_ENV)
                .map(Some)
                .map_err(|_| {
                    ServiceError::Config(format!(
                        "notify_base_url is set but {NOTIFY_SEED_ENV} is not"
                    ))
                }),
            Environment::Production => {
                let path = self.notify_signing_key_file.as_ref().ok_or_else(|| {
                    ServiceError::Config(
                        "notify_base_url is set but notify_signing_key_file is not".into(),
                    )
                })?;
                std::fs::read_to_string(path)
                    .map(|s| Some(s.trim().to_string()))
                    .map_err(|e| {
                        ServiceError::Config(format!(
                            "cannot read notify signing key {}: {e}",
                            path.display()
                        ))
                    })
            }
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            notify_base_url: None,
            notify_signing_key_file: None,
            health_timeout_secs: default_health_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            challenge_timeout_secs: default_challenge_timeout_secs(),
            max_concurrent_syncs: default_max_concurrent_syncs(),
            batch_deadline_secs: default_batch_deadline_secs(),
            block_on_validation_failure: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
