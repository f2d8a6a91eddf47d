//! Chaincode challenge/response verification.
//!
//! Proof-of-possession protocol between this service and a user-operated
//! profile service:
//!
//! 1. We mint a single-use random salt and POST it to the service.
//! 2. The service concatenates the salt with the chaincode (the shared
//!    secret it was provisioned with) and answers
//!    `hex(sha512(salt || chaincode))`.
//! 3. We compute the same digest locally and compare.
//!
//! A matching answer proves the service knows the chaincode without the
//! secret ever crossing the wire; anything else — wrong hash, wrong status,
//! garbage body — blocks the account.

pub mod error;
pub mod hash;
pub mod salt;
pub mod verifier;

pub use error::ChaincodeError;
pub use hash::challenge_hash;
pub use salt::{OsSaltSource, SaltSource, SALT_LEN};
pub use verifier::{ChaincodeVerifier, VerificationStatus};
