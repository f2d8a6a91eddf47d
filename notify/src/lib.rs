//! Blocked-account notifications.
//!
//! When an account gets blocked and has a chat handle on file, the service
//! POSTs `{userId, reason}` to the notification bot's `/profile/blocked`
//! endpoint. The request carries a short-lived bearer token signed with
//! this service's Ed25519 key so the bot can tell our calls from anyone
//! else's.
//!
//! Notification delivery is best-effort: callers log a failed send and
//! move on. A missing ping never fails the block itself.

pub mod client;
pub mod error;
pub mod token;

pub use client::NotifyClient;
pub use error::NotifyError;
pub use token::{verify_token, TokenSigner, TOKEN_TTL_MS};
