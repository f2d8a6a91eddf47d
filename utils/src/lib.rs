//! Shared utilities for the idsync service.

pub mod logging;

pub use logging::{init_logging, LogFormat};
