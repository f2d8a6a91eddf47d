//! Single-use challenge salts.

use crate::ChaincodeError;

/// Length of every challenge salt, in characters.
pub const SALT_LEN: usize = 21;

const SALT_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Largest multiple of the alphabet size below 256. Bytes at or above this
// are discarded so every character stays equally likely.
const REJECT_FROM: u8 = 248;

/// Source of challenge salts.
///
/// The production implementation draws from the OS CSPRNG; tests swap in a
/// fixed source to make challenge digests predictable.
pub trait SaltSource {
    fn salt(&self) -> Result<String, ChaincodeError>;
}

/// Salt source backed by the operating system's CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn salt(&self) -> Result<String, ChaincodeError> {
        let mut out = String::with_capacity(SALT_LEN);
        let mut buf = [0u8; 32];
        while out.len() < SALT_LEN {
            getrandom::getrandom(&mut buf).map_err(|e| ChaincodeError::Rng(e.to_string()))?;
            for &b in buf.iter() {
                if b >= REJECT_FROM {
                    continue;
                }
                out.push(SALT_ALPHABET[(b % 62) as usize] as char);
                if out.len() == SALT_LEN {
                    break;
                }
            }
        }
        Ok(out)
    }
}
