//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the sync pipeline (storage, challenge salts)
//! are abstracted behind traits or explicit parameters. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod salts;
pub mod store;

pub use salts::FixedSalts;
pub use store::NullStore;
