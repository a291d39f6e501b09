//! # Digest -- Sign or check a message with a private key.
//!
//! ```bash
//! bt digest --private-key-env BRAINTREE_PRIVATE_KEY "kind=create_customer"
//! bt digest --private-key-env BRAINTREE_PRIVATE_KEY --verify 4f1c... "kind=create_customer"
//! ```
//!
//! The key is read from an environment variable so it never appears in the
//! process list or shell history.

use anyhow::{Context, Result};
use braintree_core::{hex_digest, verify_hex_digest};
use clap::Args;

/// Arguments for `bt digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Environment variable holding the private key.
    #[arg(long, default_value = "BRAINTREE_PRIVATE_KEY")]
    pub private_key_env: String,

    /// Compare against this hex digest instead of printing one.
    #[arg(long)]
    pub verify: Option<String>,

    /// Message to digest.
    pub message: String,
}

/// Execute `bt digest`.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let private_key = std::env::var(&args.private_key_env)
        .with_context(|| format!("{} environment variable is not set", args.private_key_env))?;
    Ok(digest_with_key(&private_key, args))
}

fn digest_with_key(private_key: &str, args: &DigestArgs) -> u8 {
    match &args.verify {
        None => {
            println!("{}", hex_digest(private_key, &args.message));
            0
        }
        Some(expected) => match verify_hex_digest(private_key, &args.message, expected) {
            Ok(()) => {
                println!("OK");
                0
            }
            Err(err) => {
                println!("FAILED: {err}");
                1
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verify: Option<String>) -> DigestArgs {
        DigestArgs {
            private_key_env: "UNUSED".into(),
            verify,
            message: "id=abc&kind=create_customer".into(),
        }
    }

    #[test]
    fn prints_digest() {
        assert_eq!(digest_with_key("secret", &args(None)), 0);
    }

    #[test]
    fn verify_accepts_matching_digest() {
        let expected = hex_digest("secret", "id=abc&kind=create_customer");
        assert_eq!(digest_with_key("secret", &args(Some(expected))), 0);
    }

    #[test]
    fn verify_rejects_wrong_key_and_garbage() {
        let expected = hex_digest("other", "id=abc&kind=create_customer");
        assert_eq!(digest_with_key("secret", &args(Some(expected))), 1);
        assert_eq!(digest_with_key("secret", &args(Some("zz".into()))), 1);
    }

    #[test]
    fn missing_key_variable_is_an_error() {
        let mut a = args(None);
        a.private_key_env = "BT_CLI_TEST_UNSET_PRIVATE_KEY_VAR".into();
        let err = run_digest(&a).unwrap_err();
        assert!(err.to_string().contains("BT_CLI_TEST_UNSET_PRIVATE_KEY_VAR"));
    }
}
