//! # braintree-cli -- The `bt` command-line tool
//!
//! Thin front end over `braintree-core` and `braintree-client`.
//!
//! ## Subcommands
//!
//! - `bt verify-keys` -- Check a JSON attribute file against a request signature.
//! - `bt digest` -- HMAC-SHA1 hex digest of a message under a private key.
//! - `bt tr-data` -- Signed transparent redirect form data.
//! - `bt customer` -- Look up or delete vault customers.
//!
//! Commands that talk to the gateway read their credentials with
//! `GatewayConfig::from_env` (`BRAINTREE_ENVIRONMENT`, `BRAINTREE_MERCHANT_ID`,
//! `BRAINTREE_PUBLIC_KEY`, `BRAINTREE_PRIVATE_KEY`).
//!
//! ```bash
//! bt verify-keys --signature customer-create customer.json
//! bt digest --private-key-env BRAINTREE_PRIVATE_KEY "id=abc&kind=create_customer"
//! bt tr-data --kind create-customer --redirect-url https://example.com/done
//! bt customer find c123
//! ```

pub mod customer;
pub mod digest;
pub mod keys;
pub mod tr_data;

use std::path::Path;

use anyhow::{bail, Context, Result};
use braintree_core::Attributes;
use serde_json::Value;

/// Read a JSON object of request attributes from `path`.
pub fn read_attributes(path: &Path) -> Result<Attributes> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attribute file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "expected a JSON object in {}, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
