use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid signing key: {0}")]
    BadKey(String),

    #[error("invalid token: {0}")]
    BadToken(String),

    #[error("webhook request failed: {0}")]
    Send(String),

    #[error("webhook answered HTTP status {0}")]
    BadStatus(u16),
}
