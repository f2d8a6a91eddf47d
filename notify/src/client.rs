//! The webhook client.

use std::time::Duration;

use idsync_types::Timestamp;
use serde::Serialize;

use crate::token::TokenSigner;
use crate::NotifyError;

/// Default timeout for webhook requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct BlockedNotification<'a> {
    /// The account's chat handle, which is what the bot keys on.
    #[serde(rename = "userId")]
    user_id: &'a str,
    reason: &'a str,
}

/// Client for the notification bot's webhook.
pub struct NotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    signer: TokenSigner,
}

impl NotifyClient {
    pub fn new(base_url: impl Into<String>, signer: TokenSigner) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into(),
            signer,
        }
    }

    /// `POST {base}/profile/blocked` with a freshly minted bearer.
    ///
    /// Callers treat failure as best-effort: log it, never fail the block.
    pub async fn profile_blocked(
        &self,
        discord_id: &str,
        reason: &str,
    ) -> Result<(), NotifyError> {
        let url = format!(
            "{}/profile/blocked",
            self.base_url.trim_end_matches('/')
        );
        let token = self.signer.mint(Timestamp::now());
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&BlockedNotification {
                user_id: discord_id,
                reason,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::BadStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
