//! Profile reconciliation.
//!
//! Compares a freshly fetched profile against the user's canonical profile
//! and the diffs already staged for review, and decides what to persist:
//!
//! - nothing changed — the stored canonical copy still matches, any stale
//!   pending diff is moot and gets resolved;
//! - unchanged since the last proposal — a reviewer already has this exact
//!   profile in front of them, touch nothing;
//! - changed, but identical to something a reviewer already rejected —
//!   do not resubmit it;
//! - genuinely new — supersede the old pending diff and stage a new one.
//!
//! [`decide`] is the pure decision function; [`Reconciler`] applies its
//! side effects against the stores. Fetched profiles pass through
//! [`validate_profile`] before they are allowed anywhere near a decision.

pub mod decision;
pub mod error;
pub mod reconciler;
pub mod validate;

pub use decision::{decide, Decision};
pub use error::ReconcileError;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use validate::{validate_profile, ValidationError};
