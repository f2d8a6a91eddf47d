//! Millisecond timestamps.
//!
//! All persisted times (diff creation, account updates, audit entries) are
//! Unix epoch milliseconds (UTC), matching the timestamps the remote
//! services and the review tooling already use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (UTC).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_millis() as u64;
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp::new(1_000) < Timestamp::new(2_000));
        assert_eq!(Timestamp::new(5).as_millis(), 5);
    }

    #[test]
    fn elapsed_saturates() {
        let earlier = Timestamp::new(1_000);
        let later = Timestamp::new(4_000);
        assert_eq!(earlier.elapsed_since(later), 3_000);
        assert_eq!(later.elapsed_since(earlier), 0);
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Timestamp::new(42)).unwrap(), "42");
    }
}
