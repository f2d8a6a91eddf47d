//! The challenge verifier.

use std::sync::Arc;

use idsync_client::ProfileServiceClient;
use idsync_types::ProfileStatus;

use crate::hash::challenge_hash;
use crate::salt::{OsSaltSource, SaltSource};
use crate::ChaincodeError;

/// Verdict of a single challenge round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    Blocked,
}

impl VerificationStatus {
    /// The account status this verdict writes back.
    pub fn as_profile_status(&self) -> ProfileStatus {
        match self {
            Self::Verified => ProfileStatus::Verified,
            Self::Blocked => ProfileStatus::Blocked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Blocked => "BLOCKED",
        }
    }
}

/// Runs chaincode challenges against profile services.
pub struct ChaincodeVerifier {
    salts: Arc<dyn SaltSource + Send + Sync>,
}

impl ChaincodeVerifier {
    pub fn new() -> Self {
        Self {
            salts: Arc::new(OsSaltSource),
        }
    }

    /// Use a specific salt source (fixed salts in tests).
    pub fn with_salt_source(salts: Arc<dyn SaltSource + Send + Sync>) -> Self {
        Self { salts }
    }

    /// Run one challenge round against the service at `base_url`.
    ///
    /// Protocol-level rejections — wrong hash, non-200 answer, malformed
    /// body — come back as `Ok(Blocked)`. Only a transport failure (refused
    /// connection, timeout) is an `Err`, and callers record BLOCKED when
    /// they see one, so no path through here ever upgrades a failure to
    /// VERIFIED.
    pub async fn verify(
        &self,
        client: &ProfileServiceClient,
        base_url: &str,
        secret: &str,
    ) -> Result<VerificationStatus, ChaincodeError> {
        let salt = self.salts.salt()?;
        let expected = challenge_hash(&salt, secret);

        match client.send_challenge(base_url, &salt).await {
            Ok(answer) if answer == expected => Ok(VerificationStatus::Verified),
            Ok(answer) => {
                tracing::debug!(
                    base_url,
                    answer_len = answer.len(),
                    "challenge answer did not match"
                );
                Ok(VerificationStatus::Blocked)
            }
            Err(e) if e.is_protocol() => {
                tracing::debug!(base_url, error = %e, "challenge rejected at protocol level");
                Ok(VerificationStatus::Blocked)
            }
            Err(e) => Err(ChaincodeError::Transport(e)),
        }
    }
}

impl Default for ChaincodeVerifier {
    fn default() -> Self {
        Self::new()
    }
}
