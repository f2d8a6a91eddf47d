//! The profile-service HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use idsync_types::ProfileRecord;

use crate::ClientError;

/// Default timeout for profile-service requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one leg of the profile-service contract.
///
/// Carries a single request timeout; callers that need different budgets
/// per operation (short health pings, longer profile fetches) construct one
/// client per budget — the underlying connection pool is cheap.
#[derive(Clone)]
pub struct ProfileServiceClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct ChallengeRequest<'a> {
    salt: &'a str,
}

/// Raw JSON answer from `POST /verification`.
///
/// A missing `hash` field decodes to the empty string, which can never
/// match a real digest; services that answer nonsense are simply blocked.
#[derive(Debug, Deserialize)]
struct ChallengeResponse {
    #[serde(default)]
    hash: String,
}

impl ProfileServiceClient {
    /// Create a client with default timeout settings.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .unwrap_or_default();
        Self { http_client }
    }

    /// `GET {base}/health` — `Ok(())` iff the service answered 2xx.
    pub async fn health(&self, base_url: &str) -> Result<(), ClientError> {
        let url = endpoint(base_url, "health");
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(ClientError::BadStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(())
    }

    /// `GET {base}/profile` with `Authorization: Bearer <bearer>`.
    pub async fn fetch_profile(
        &self,
        base_url: &str,
        bearer: &str,
    ) -> Result<ProfileRecord, ClientError> {
        let url = endpoint(base_url, "profile");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ClientError::Unauthenticated(url));
        }
        if !status.is_success() {
            return Err(ClientError::BadStatus {
                status: status.as_u16(),
                url,
            });
        }

        response.json::<ProfileRecord>().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse profile body: {e}"))
        })
    }

    /// `POST {base}/verification` with `{"salt"}`, returning the hash the
    /// service answered with.
    pub async fn send_challenge(
        &self,
        base_url: &str,
        salt: &str,
    ) -> Result<String, ClientError> {
        let url = endpoint(base_url, "verification");
        let response = self
            .http_client
            .post(&url)
            .json(&ChallengeRequest { salt })
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(ClientError::BadStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let answer: ChallengeResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse challenge answer: {e}"))
        })?;
        Ok(answer.hash)
    }
}

impl Default for ProfileServiceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a base URL and a path segment, tolerating trailing slashes the way
/// users actually configure their URLs.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

fn send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else if e.is_connect() {
        ClientError::Connect(e.to_string())
    } else {
        ClientError::Request(e.to_string())
    }
}
