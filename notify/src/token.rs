//! Compact Ed25519 bearer tokens for the notification webhook.
//!
//! A token is `base64url(payload) "." base64url(signature)`, where the
//! payload is a small JSON claim set `{iss, iat, exp}` and the signature
//! is Ed25519 over the raw payload bytes. Tokens expire one minute after
//! minting; each webhook call mints a fresh one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use idsync_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::NotifyError;

/// Token lifetime: one minute, in milliseconds.
pub const TOKEN_TTL_MS: u64 = 60_000;

/// Issuer written into every token this service mints.
const ISSUER: &str = "idsync";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    /// Issued-at, epoch milliseconds.
    iat: u64,
    /// Expiry, epoch milliseconds.
    exp: u64,
}

/// Mints webhook bearer tokens from this service's Ed25519 key.
pub struct TokenSigner {
    signing_key: SigningKey,
}

impl TokenSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Build a signer from a 32-byte hex seed (the on-disk key format).
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, NotifyError> {
        let bytes = hex::decode(seed_hex.trim())
            .map_err(|e| NotifyError::BadKey(format!("seed is not hex: {e}")))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| NotifyError::BadKey("seed must be exactly 32 bytes".into()))?;
        Ok(Self::new(SigningKey::from_bytes(&seed)))
    }

    /// The verifying key the webhook side pins.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Mint a token valid for [`TOKEN_TTL_MS`] from `now`.
    pub fn mint(&self, now: Timestamp) -> String {
        let claims = Claims {
            iss: ISSUER.to_string(),
            iat: now.as_millis(),
            exp: now.as_millis() + TOKEN_TTL_MS,
        };
        let payload =
            serde_json::to_vec(&claims).expect("claim set is always serializable");
        let signature = self.signing_key.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }
}

/// Check a token's signature, issuer, and expiry against `now`.
///
/// This is the receiving side of the contract; the service itself only
/// mints. Kept here so both halves of the token format live in one file.
pub fn verify_token(
    token: &str,
    key: &VerifyingKey,
    now: Timestamp,
) -> Result<(), NotifyError> {
    let (payload_b64, signature_b64) = token
        .split_once('.')
        .ok_or_else(|| NotifyError::BadToken("missing '.' separator".into()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| NotifyError::BadToken(format!("payload is not base64url: {e}")))?;
    let signature_bytes: [u8; 64] = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| NotifyError::BadToken(format!("signature is not base64url: {e}")))?
        .try_into()
        .map_err(|_| NotifyError::BadToken("signature must be 64 bytes".into()))?;

    let signature = Signature::from_bytes(&signature_bytes);
    key.verify(&payload, &signature)
        .map_err(|_| NotifyError::BadToken("signature check failed".into()))?;

    let claims: Claims = serde_json::from_slice(&payload)
        .map_err(|e| NotifyError::BadToken(format!("payload is not a claim set: {e}")))?;
    if claims.iss != ISSUER {
        return Err(NotifyError::BadToken(format!(
            "unexpected issuer {}",
            claims.iss
        )));
    }
    if claims.exp <= now.as_millis() {
        return Err(NotifyError::BadToken("token expired".into()));
    }
    Ok(())
}
