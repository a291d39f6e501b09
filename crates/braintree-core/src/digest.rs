//! # Request Digests
//!
//! HMAC-SHA1 digests used to sign transparent redirect data and to check the
//! query strings the gateway redirects back with.
//!
//! The HMAC key is not the private key itself but its raw 20-byte SHA-1
//! digest. Output is 40 lowercase hex characters.

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::error::DigestError;

type HmacSha1 = Hmac<Sha1>;

/// Length of a hex-encoded SHA-1 digest.
pub const HEX_DIGEST_LEN: usize = 40;

/// Raw 20-byte HMAC-SHA1 of `message` under the hashed private key.
pub fn raw_digest(private_key: &str, message: &str) -> [u8; 20] {
    let key_digest = Sha1::digest(private_key.as_bytes());
    let mut mac = HmacSha1::new_from_slice(&key_digest).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let mut output = [0u8; 20];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Hex-encoded HMAC-SHA1 of `message` under the hashed private key.
pub fn hex_digest(private_key: &str, message: &str) -> String {
    hex::encode(raw_digest(private_key, message))
}

/// Check `expected` against the digest of `message` in constant time.
///
/// # Errors
///
/// [`DigestError::Malformed`] when `expected` is not 40 hex characters,
/// [`DigestError::Mismatch`] when it does not match.
pub fn verify_hex_digest(private_key: &str, message: &str, expected: &str) -> Result<(), DigestError> {
    if expected.len() != HEX_DIGEST_LEN {
        return Err(DigestError::Malformed(expected.to_string()));
    }
    let expected_bytes =
        hex::decode(expected.to_ascii_lowercase()).map_err(|_| DigestError::Malformed(expected.to_string()))?;
    let actual = raw_digest(private_key, message);
    if bool::from(actual.as_slice().ct_eq(&expected_bytes)) {
        Ok(())
    } else {
        Err(DigestError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Textbook HMAC construction with 64-byte pads, for cross-checking.
    fn manual_hmac_sha1(key: &str, message: &str) -> String {
        let key_digest = Sha1::digest(key.as_bytes());
        let mut inner_pad = [0x36u8; 64];
        let mut outer_pad = [0x5cu8; 64];
        for i in 0..20 {
            inner_pad[i] ^= key_digest[i];
            outer_pad[i] ^= key_digest[i];
        }
        let mut inner = Sha1::new();
        inner.update(inner_pad);
        inner.update(message.as_bytes());
        let inner_hash = inner.finalize();

        let mut outer = Sha1::new();
        outer.update(outer_pad);
        outer.update(inner_hash);
        hex::encode(outer.finalize())
    }

    #[test]
    fn digest_matches_manual_construction() {
        let key = "integration_private_key";
        let message = "public_key=integration_public_key&time=20100101120000";
        assert_eq!(hex_digest(key, message), manual_hmac_sha1(key, message));
    }

    #[test]
    fn digest_is_forty_lowercase_hex_chars() {
        let d = hex_digest("secret", "message");
        assert_eq!(d.len(), HEX_DIGEST_LEN);
        assert!(d.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn digest_depends_on_key_and_message() {
        assert_ne!(hex_digest("k1", "m"), hex_digest("k2", "m"));
        assert_ne!(hex_digest("k", "m1"), hex_digest("k", "m2"));
    }

    #[test]
    fn verify_accepts_matching_digest_in_any_case() {
        let d = hex_digest("secret", "payload");
        assert!(verify_hex_digest("secret", "payload", &d).is_ok());
        assert!(verify_hex_digest("secret", "payload", &d.to_uppercase()).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let d = hex_digest("secret", "payload");
        assert_eq!(
            verify_hex_digest("secret", "payload2", &d),
            Err(DigestError::Mismatch)
        );
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        assert!(matches!(
            verify_hex_digest("secret", "payload", "abc"),
            Err(DigestError::Malformed(_))
        ));
        let not_hex = "z".repeat(HEX_DIGEST_LEN);
        assert!(matches!(
            verify_hex_digest("secret", "payload", &not_hex),
            Err(DigestError::Malformed(_))
        ));
    }
}
