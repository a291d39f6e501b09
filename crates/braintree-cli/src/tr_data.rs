//! # Transparent Redirect Data -- Print signed `tr_data` for a payment form.
//!
//! ```bash
//! bt tr-data --kind create-customer --redirect-url https://example.com/done
//! bt tr-data --kind transaction --redirect-url https://example.com/done sale.json
//! ```
//!
//! The optional FILE holds the JSON parameters to protect (for example
//! `{"transaction": {"type": "sale", "amount": "10.00"}}`); the redirect URL
//! is added from the flag.

use std::path::PathBuf;

use anyhow::{Context, Result};
use braintree_client::transparent_redirect::TransparentRedirectClient;
use braintree_client::{BraintreeGateway, GatewayConfig};
use braintree_core::Attributes;
use clap::{Args, ValueEnum};
use serde_json::Value;

use crate::read_attributes;

/// Arguments for `bt tr-data`.
#[derive(Args, Debug)]
pub struct TrDataArgs {
    /// What the form creates or updates.
    #[arg(long, value_enum)]
    pub kind: TrKind,

    /// Where the gateway sends the browser after the post.
    #[arg(long)]
    pub redirect_url: String,

    /// JSON file with the protected parameters.
    pub file: Option<PathBuf>,
}

/// Transparent redirect form kinds.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrKind {
    Transaction,
    CreateCustomer,
    UpdateCustomer,
    CreateCreditCard,
    UpdateCreditCard,
}

/// Execute `bt tr-data`.
pub fn run_tr_data(args: &TrDataArgs) -> Result<u8> {
    let config = GatewayConfig::from_env().context("gateway configuration")?;
    let gateway = BraintreeGateway::new(config)?;
    let params = match &args.file {
        Some(path) => read_attributes(path)?,
        None => Attributes::new(),
    };
    let tr_data = build_tr_data(gateway.transparent_redirect(), args.kind, &args.redirect_url, params)?;
    println!("{}", gateway.transparent_redirect().url());
    println!("{tr_data}");
    Ok(0)
}

/// Signed form data for `kind`.
pub fn build_tr_data(
    client: &TransparentRedirectClient,
    kind: TrKind,
    redirect_url: &str,
    mut params: Attributes,
) -> Result<String> {
    params.insert("redirectUrl".into(), Value::String(redirect_url.to_string()));
    let params = Value::Object(params);
    let data = match kind {
        TrKind::Transaction => client.transaction_data(&params),
        TrKind::CreateCustomer => client.create_customer_data(&params),
        TrKind::UpdateCustomer => client.update_customer_data(&params),
        TrKind::CreateCreditCard => client.create_credit_card_data(&params),
        TrKind::UpdateCreditCard => client.update_credit_card_data(&params),
    }?;
    Ok(data)
}
