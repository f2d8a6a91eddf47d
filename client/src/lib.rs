//! HTTP client for user-operated profile services.
//!
//! Every user runs their own small HTTP service; this crate speaks its
//! three-endpoint contract:
//!
//! - `GET {base}/health` — 200 means the service is up.
//! - `GET {base}/profile` with `Authorization: Bearer <hash>` — the
//!   self-reported [`ProfileRecord`] as JSON; 401 means the bearer was
//!   rejected.
//! - `POST {base}/verification` with `{"salt": ...}` — the service answers
//!   `{"hash": ...}`, its proof of chaincode possession.
//!
//! The services are untrusted and may never respond, so every request runs
//! under the client's timeout.

pub mod error;
pub mod profile_service;

pub use error::ClientError;
pub use profile_service::ProfileServiceClient;
