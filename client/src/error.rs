use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("bearer rejected by {0}")]
    Unauthenticated(String),

    #[error("unexpected HTTP status {status} from {url}")]
    BadStatus { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// The remote answered, but the answer fails the contract
    /// (wrong status, rejected bearer, unparseable body).
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated(_) | Self::BadStatus { .. } | Self::InvalidResponse(_)
        )
    }

    /// No usable response arrived at all.
    pub fn is_transport(&self) -> bool {
        !self.is_protocol()
    }
}
