//! HTTP invocation surface for the idsync service.
//!
//! Endpoints:
//! - `POST /profile` — sync one user's profile
//! - `POST /profiles` — sync every VERIFIED user
//! - `POST /verify` — run the chaincode challenge for one user
//! - `POST /health-check` — probe the whole fleet
//! - `GET /healthz` — liveness
//! - `GET /metrics` — Prometheus exposition

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, serve};
