//! Vaulted credit cards.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/payment_methods` | Create |
//! | GET    | `/payment_methods/{token}` | Find |
//! | PUT    | `/payment_methods/{token}` | Update |
//! | DELETE | `/payment_methods/{token}` | Delete |

use std::fmt;

use braintree_core::{validate_id, verify_keys, IdKind, Signature, SignatureNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;
use crate::error::GatewayError;
use crate::http::GatewayHttp;
use crate::resource::{attributes_of, not_found_as, nullable, rooted, write_display};
use crate::result::{expect_resource, verify_gateway_response, GatewayResult};

/// A credit card stored in the vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    #[serde(default, deserialize_with = "nullable")]
    pub token: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bin: String,
    #[serde(rename = "last4", default, deserialize_with = "nullable")]
    pub last_4: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cardholder_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub card_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub expiration_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub expiration_year: String,
    #[serde(default, deserialize_with = "nullable")]
    pub default: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub billing_address: Option<Address>,
    #[serde(default, deserialize_with = "nullable")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreditCard {
    /// `MM/YYYY`.
    pub fn expiration_date(&self) -> String {
        format!("{}/{}", self.expiration_month, self.expiration_year)
    }

    /// `bin******last4`.
    pub fn masked_number(&self) -> String {
        format!("{}******{}", self.bin, self.last_4)
    }

    /// Whether this is the customer's default card.
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Whether `other` is the same vaulted card.
    pub fn same_id(&self, other: &CreditCard) -> bool {
        self.token == other.token
    }

    /// Keys accepted when vaulting a card.
    pub fn create_signature() -> Signature {
        Signature::new()
            .keys([
                "customerId",
                "cardholderName",
                "cvv",
                "number",
                "expirationDate",
                "expirationMonth",
                "expirationYear",
                "token",
            ])
            .nested(
                "options",
                Signature::new().keys(["makeDefault", "verificationMerchantAccountId", "verifyCard"]),
            )
            .nested("billingAddress", Address::update_signature())
    }

    /// Keys accepted when updating a card. The billing address may ask to
    /// update the existing address in place.
    pub fn update_signature() -> Signature {
        let mut signature = Self::create_signature().without_key("customerId");
        signature.push_into(
            &["billingAddress"],
            SignatureNode::Nested("options".into(), vec![SignatureNode::Key("updateExisting".into())]),
        );
        signature
    }
}

impl fmt::Display for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_display(f, "CreditCard", self)
    }
}

/// Result of a card verification the gateway ran on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardVerification {
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_error_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_postal_code_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_street_address_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cvv_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub processor_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub processor_response_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merchant_account_id: String,
}

impl fmt::Display for CreditCardVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_display(f, "CreditCardVerification", self)
    }
}

/// Client for vaulted credit cards.
#[derive(Debug, Clone)]
pub struct CreditCardClient {
    http: GatewayHttp,
}

impl CreditCardClient {
    pub(crate) fn new(http: GatewayHttp) -> Self {
        Self { http }
    }

    /// Vault a card.
    pub async fn create(&self, attributes: &Value) -> Result<GatewayResult<CreditCard>, GatewayError> {
        let attrs = attributes_of(attributes)?;
        verify_keys(&CreditCard::create_signature(), &attrs)?;
        let tree = self
            .http
            .post("/payment_methods", Some(&rooted("creditCard", attrs)))
            .await?;
        verify_gateway_response(tree, "creditCard")
    }

    /// [`create`](Self::create), failing on validation errors.
    pub async fn create_no_validate(&self, attributes: &Value) -> Result<CreditCard, GatewayError> {
        self.create(attributes).await?.into_resource()
    }

    /// Look up a card by token.
    pub async fn find(&self, token: &str) -> Result<CreditCard, GatewayError> {
        validate_id(IdKind::CreditCardToken, token)?;
        let tree = self
            .http
            .get(&format!("/payment_methods/{token}"))
            .await
            .map_err(not_found_as(format!("credit card with token {token} not found")))?;
        expect_resource(tree, "creditCard")
    }

    /// Update a card.
    pub async fn update(&self, token: &str, attributes: &Value) -> Result<GatewayResult<CreditCard>, GatewayError> {
        let attrs = attributes_of(attributes)?;
        verify_keys(&CreditCard::update_signature(), &attrs)?;
        validate_id(IdKind::CreditCardToken, token)?;
        let tree = self
            .http
            .put(&format!("/payment_methods/{token}"), Some(&rooted("creditCard", attrs)))
            .await?;
        verify_gateway_response(tree, "creditCard")
    }

    /// [`update`](Self::update), failing on validation errors.
    pub async fn update_no_validate(&self, token: &str, attributes: &Value) -> Result<CreditCard, GatewayError> {
        self.update(token, attributes).await?.into_resource()
    }

    /// Remove a card from the vault.
    pub async fn delete(&self, token: &str) -> Result<(), GatewayError> {
        validate_id(IdKind::CreditCardToken, token)?;
        self.http.delete(&format!("/payment_methods/{token}")).await?;
        Ok(())
    }
}
