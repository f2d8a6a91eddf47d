//! The challenge digest.

use sha2::{Digest, Sha512};

/// `hex(sha512(salt || secret))`, the digest both sides of a challenge
/// compute independently.
pub fn challenge_hash(salt: &str, secret: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // sha512("abc") — the concatenation is what gets hashed, so
        // ("ab", "c") and ("a", "bc") must agree with it.
        let expected = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                        2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";
        assert_eq!(challenge_hash("ab", "c"), expected);
        assert_eq!(challenge_hash("a", "bc"), expected);
        assert_eq!(challenge_hash("abc", ""), expected);
    }

    #[test]
    fn digest_is_lowercase_hex_of_fixed_width() {
        let digest = challenge_hash("salt", "secret");
        assert_eq!(digest.len(), 128);
        assert!(digest.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(digest, digest.to_lowercase());
    }

    #[test]
    fn different_salt_changes_digest() {
        assert_ne!(
            challenge_hash("salt-one", "secret"),
            challenge_hash("salt-two", "secret")
        );
    }

    #[test]
    fn different_secret_changes_digest() {
        assert_ne!(
            challenge_hash("salt", "secret-one"),
            challenge_hash("salt", "secret-two")
        );
    }
}
