//! # Key Check -- Verify an attribute file against a request signature.
//!
//! ```bash
//! bt verify-keys --signature customer-create customer.json
//! ```
//!
//! Exit code 0 when every key is permitted, 1 when any is rejected. The
//! rejected paths are printed one per line, bracketed the way the gateway
//! names them (`creditCard[billingAddress][bogus]`).

use std::path::PathBuf;

use anyhow::Result;
use braintree_client::address::Address;
use braintree_client::credit_card::CreditCard;
use braintree_client::customer::Customer;
use braintree_client::transaction::Transaction;
use braintree_core::{verify_keys, Signature};
use clap::{Args, ValueEnum};

use crate::read_attributes;

/// Arguments for `bt verify-keys`.
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Request signature to check against.
    #[arg(long, value_enum)]
    pub signature: SignatureName,

    /// JSON file holding the request attributes.
    pub file: PathBuf,
}

/// Request signatures the tool knows by name.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureName {
    CustomerCreate,
    CustomerUpdate,
    AddressCreate,
    AddressUpdate,
    CreditCardCreate,
    CreditCardUpdate,
    TransactionCreate,
}

impl SignatureName {
    /// The signature this name selects.
    pub fn signature(self) -> Signature {
        match self {
            Self::CustomerCreate => Customer::create_signature(),
            Self::CustomerUpdate => Customer::update_signature(),
            Self::AddressCreate => Address::create_signature(),
            Self::AddressUpdate => Address::update_signature(),
            Self::CreditCardCreate => CreditCard::create_signature(),
            Self::CreditCardUpdate => CreditCard::update_signature(),
            Self::TransactionCreate => Transaction::create_signature(),
        }
    }
}

/// Execute `bt verify-keys`.
pub fn run_keys(args: &KeysArgs) -> Result<u8> {
    let attributes = read_attributes(&args.file)?;
    match verify_keys(&args.signature.signature(), &attributes) {
        Ok(()) => {
            println!("OK: {} keys permitted", attributes.len());
            Ok(0)
        }
        Err(err) => {
            tracing::info!(file = %args.file.display(), rejected = err.keys.len(), "keys rejected");
            println!("REJECTED:");
            for key in &err.keys {
                println!("  {key}");
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let file = dir.path().join("attrs.json");
        std::fs::write(&file, body).unwrap();
        file
    }

    #[test]
    fn permitted_keys_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            r#"{"firstName": "Dan", "creditCard": {"number": "4111111111111111", "billingAddress": {"postalCode": "60622"}}}"#,
        );
        let args = KeysArgs {
            signature: SignatureName::CustomerCreate,
            file,
        };
        assert_eq!(run_keys(&args).unwrap(), 0);
    }

    #[test]
    fn rejected_keys_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, r#"{"customerId": "c1", "bogus": true}"#);
        let args = KeysArgs {
            signature: SignatureName::AddressUpdate,
            file,
        };
        assert_eq!(run_keys(&args).unwrap(), 1);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = KeysArgs {
            signature: SignatureName::TransactionCreate,
            file: dir.path().join("missing.json"),
        };
        assert!(run_keys(&args).is_err());
    }

    #[test]
    fn update_signatures_differ_from_create() {
        let create = SignatureName::CreditCardCreate.signature().flatten();
        let update = SignatureName::CreditCardUpdate.signature().flatten();
        assert!(create.contains("customerId"));
        assert!(!update.contains("customerId"));
        assert!(update.contains("billingAddress[options][updateExisting]"));
    }
}
