//! # braintree-client -- Typed async client for the Braintree gateway
//!
//! Covers the vault and payment resources of the gateway XML API:
//! - **Customers** via `/customers`
//! - **Addresses** via `/customers/{customer_id}/addresses`
//! - **Credit cards** via `/payment_methods`
//! - **Transactions** via `/transactions`
//! - **Transparent redirect** via `/transparent_redirect_requests`
//!
//! ## Request Flow
//!
//! Every mutating call checks the caller's attributes against the resource's
//! request signature before anything is sent, so unknown keys fail locally
//! with [`GatewayError::InvalidKeys`]. Bodies travel as gateway XML and
//! responses come back as [`result::GatewayResult`] values that carry either
//! the resource or structured validation errors.
//!
//! All paths are relative to `{base_url}/merchants/{merchant_id}`.

pub mod address;
pub mod collection;
pub mod config;
pub mod credit_card;
pub mod customer;
pub mod error;
pub mod http;
pub(crate) mod resource;
pub mod result;
pub(crate) mod retry;
pub mod search;
pub mod test_values;
pub mod transaction;
pub mod transparent_redirect;
pub mod xml;

pub use config::{Environment, GatewayConfig};
pub use error::GatewayError;
pub use result::{ErrorResult, GatewayResult, ValidationError, ValidationErrorCollection};

/// Top-level gateway client. Holds sub-clients for each resource.
#[derive(Debug, Clone)]
pub struct BraintreeGateway {
    customers: customer::CustomerClient,
    addresses: address::AddressClient,
    credit_cards: credit_card::CreditCardClient,
    transactions: transaction::TransactionClient,
    transparent_redirect: transparent_redirect::TransparentRedirectClient,
}

impl BraintreeGateway {
    /// Create a gateway client from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = http::GatewayHttp::new(&config)?;
        tracing::debug!(merchant_url = http.merchant_url(), "gateway client ready");
        let transactions = transaction::TransactionClient::new(http.clone());

        Ok(Self {
            customers: customer::CustomerClient::new(http.clone(), transactions.clone()),
            addresses: address::AddressClient::new(http.clone()),
            credit_cards: credit_card::CreditCardClient::new(http.clone()),
            transactions,
            transparent_redirect: transparent_redirect::TransparentRedirectClient::new(http),
        })
    }

    /// Access the customers client.
    pub fn customers(&self) -> &customer::CustomerClient {
        &self.customers
    }

    /// Access the addresses client.
    pub fn addresses(&self) -> &address::AddressClient {
        &self.addresses
    }

    /// Access the credit cards client.
    pub fn credit_cards(&self) -> &credit_card::CreditCardClient {
        &self.credit_cards
    }

    /// Access the transactions client.
    pub fn transactions(&self) -> &transaction::TransactionClient {
        &self.transactions
    }

    /// Access the transparent redirect client.
    pub fn transparent_redirect(&self) -> &transparent_redirect::TransparentRedirectClient {
        &self.transparent_redirect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<BraintreeGateway>();
    }

    #[test]
    fn builds_from_mock_config() {
        let config = GatewayConfig::local_mock("http://127.0.0.1:3000", "m1").unwrap();
        let gateway = BraintreeGateway::new(config).unwrap();
        assert!(gateway
            .transparent_redirect()
            .url()
            .ends_with("/merchants/m1/transparent_redirect_requests"));
    }
}
