use idsync_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChaincodeError {
    /// The OS random source failed while minting a salt.
    #[error("salt generation failed: {0}")]
    Rng(String),

    /// No usable answer arrived from the remote service. Callers record
    /// BLOCKED when they see this; it is never a VERIFIED outcome.
    #[error("challenge transport failed: {0}")]
    Transport(#[from] ClientError),
}
