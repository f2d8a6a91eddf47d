//! Nullable salt source — deterministic challenge salts for testing.

use idsync_chaincode::{ChaincodeError, SaltSource};
use std::sync::Mutex;

/// A deterministic salt source for testing.
///
/// Returns pre-configured salts in order, cycling when exhausted.
pub struct FixedSalts {
    salts: Mutex<Vec<String>>,
    index: Mutex<usize>,
}

impl FixedSalts {
    /// Create with a sequence of deterministic salts.
    pub fn new(salts: Vec<String>) -> Self {
        assert!(!salts.is_empty(), "FixedSalts needs at least one salt");
        Self {
            salts: Mutex::new(salts),
            index: Mutex::new(0),
        }
    }

    /// Create with a single salt returned for every call.
    pub fn constant(salt: &str) -> Self {
        Self::new(vec![salt.to_string()])
    }
}

impl SaltSource for FixedSalts {
    fn salt(&self) -> Result<String, ChaincodeError> {
        let salts = self.salts.lock().unwrap();
        let mut idx = self.index.lock().unwrap();
        let current = *idx % salts.len();
        *idx += 1;
        Ok(salts[current].clone())
    }
}
