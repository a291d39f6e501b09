//! Transactions: sales, credits and their settlement lifecycle.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/transactions` | Sale or credit |
//! | GET    | `/transactions/{id}` | Find |
//! | PUT    | `/transactions/{id}/void` | Void |
//! | PUT    | `/transactions/{id}/submit_for_settlement` | Submit for settlement |
//! | POST   | `/transactions/{id}/refund` | Refund |
//! | POST   | `/transactions/advanced_search_ids` | Search |
//! | POST   | `/transactions/advanced_search` | Fetch a page |

use std::collections::BTreeMap;
use std::fmt;

use braintree_core::{validate_id, verify_keys, Attributes, IdKind, Signature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;
use crate::collection::ResourceCollection;
use crate::error::GatewayError;
use crate::http::GatewayHttp;
use crate::resource::{attributes_of, custom_fields, not_found_as, nullable, rooted, write_display};
use crate::result::{decode, expect_resource, verify_gateway_response, GatewayResult};
use crate::search::TransactionSearch;
use crate::xml::extract_array;

/// Whether money moves to or from the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Sale,
    Credit,
    /// Forward-compatible catch-all.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionType {
    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Credit => "credit",
            Self::Unknown => "unknown",
        }
    }
}

/// Processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Authorizing,
    Authorized,
    GatewayRejected,
    Failed,
    ProcessorDeclined,
    Settled,
    Settling,
    SubmittedForSettlement,
    Voided,
    /// Forward-compatible catch-all.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Customer snapshot recorded on a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable")]
    pub fax: String,
    #[serde(default, deserialize_with = "nullable")]
    pub website: String,
}

/// Card snapshot recorded on a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardDetails {
    #[serde(default, deserialize_with = "nullable")]
    pub token: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bin: String,
    #[serde(rename = "last4", default, deserialize_with = "nullable")]
    pub last_4: String,
    #[serde(default, deserialize_with = "nullable")]
    pub card_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cardholder_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub expiration_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub expiration_year: String,
}

impl CreditCardDetails {
    /// `MM/YYYY`.
    pub fn expiration_date(&self) -> String {
        format!("{}/{}", self.expiration_month, self.expiration_year)
    }

    /// `bin******last4`.
    pub fn masked_number(&self) -> String {
        format!("{}******{}", self.bin, self.last_4)
    }
}

/// One entry of a transaction's status history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    #[serde(default, deserialize_with = "nullable")]
    pub status: TransactionStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub amount: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transaction_source: String,
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A transaction as returned by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub transaction_type: TransactionType,
    #[serde(default, deserialize_with = "nullable")]
    pub status: TransactionStatus,
    /// Decimal amount as sent by the gateway, e.g. `1000.00`.
    #[serde(default, deserialize_with = "nullable")]
    pub amount: String,
    #[serde(default, deserialize_with = "nullable")]
    pub currency_iso_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub order_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merchant_account_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub processor_authorization_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub processor_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub processor_response_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cvv_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_error_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_postal_code_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avs_street_address_response_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub refund_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub refunded_transaction_id: String,
    #[serde(rename = "customer", default, deserialize_with = "nullable")]
    pub customer_details: CustomerDetails,
    #[serde(rename = "creditCard", default, deserialize_with = "nullable")]
    pub credit_card_details: CreditCardDetails,
    #[serde(rename = "billing", default, deserialize_with = "nullable")]
    pub billing_details: Address,
    #[serde(rename = "shipping", default, deserialize_with = "nullable")]
    pub shipping_details: Address,
    #[serde(default, deserialize_with = "custom_fields")]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub status_history: Vec<StatusDetails>,
    #[serde(default, deserialize_with = "nullable")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether `other` is the same transaction.
    pub fn same_id(&self, other: &Transaction) -> bool {
        self.id == other.id
    }

    /// Keys accepted when creating a sale or credit.
    pub fn create_signature() -> Signature {
        Signature::new()
            .keys([
                "amount",
                "customerId",
                "merchantAccountId",
                "orderId",
                "paymentMethodToken",
                "type",
            ])
            .nested(
                "creditCard",
                Signature::new().keys([
                    "token",
                    "cardholderName",
                    "cvv",
                    "expirationDate",
                    "expirationMonth",
                    "expirationYear",
                    "number",
                ]),
            )
            .nested(
                "customer",
                Signature::new().keys(["id", "company", "email", "fax", "firstName", "lastName", "phone", "website"]),
            )
            .nested("billing", Address::update_signature())
            .nested("shipping", Address::update_signature())
            .nested(
                "options",
                Signature::new().keys([
                    "storeInVault",
                    "submitForSettlement",
                    "addBillingAddressToPaymentMethod",
                    "storeShippingAddressInVault",
                ]),
            )
            .nested("customFields", Signature::new().any_key())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_display(f, "Transaction", self)
    }
}

/// Client for transactions.
#[derive(Debug, Clone)]
pub struct TransactionClient {
    http: GatewayHttp,
}

impl TransactionClient {
    pub(crate) fn new(http: GatewayHttp) -> Self {
        Self { http }
    }

    async fn create(
        &self,
        transaction_type: TransactionType,
        attributes: &Value,
    ) -> Result<GatewayResult<Transaction>, GatewayError> {
        let mut attrs = attributes_of(attributes)?;
        attrs.insert("type".into(), Value::String(transaction_type.as_str().into()));
        verify_keys(&Transaction::create_signature(), &attrs)?;
        let tree = self
            .http
            .post("/transactions", Some(&rooted("transaction", attrs)))
            .await?;
        verify_gateway_response(tree, "transaction")
    }

    /// Charge a customer.
    pub async fn sale(&self, attributes: &Value) -> Result<GatewayResult<Transaction>, GatewayError> {
        self.create(TransactionType::Sale, attributes).await
    }

    /// [`sale`](Self::sale), failing on validation errors.
    pub async fn sale_no_validate(&self, attributes: &Value) -> Result<Transaction, GatewayError> {
        self.sale(attributes).await?.into_resource()
    }

    /// Pay money back to a customer.
    pub async fn credit(&self, attributes: &Value) -> Result<GatewayResult<Transaction>, GatewayError> {
        self.create(TransactionType::Credit, attributes).await
    }

    /// [`credit`](Self::credit), failing on validation errors.
    pub async fn credit_no_validate(&self, attributes: &Value) -> Result<Transaction, GatewayError> {
        self.credit(attributes).await?.into_resource()
    }

    /// Look up a transaction.
    pub async fn find(&self, id: &str) -> Result<Transaction, GatewayError> {
        validate_id(IdKind::Transaction, id)?;
        let tree = self
            .http
            .get(&format!("/transactions/{id}"))
            .await
            .map_err(not_found_as(format!("transaction with id {id} not found")))?;
        expect_resource(tree, "transaction")
    }

    /// Void an authorized or submitted transaction.
    pub async fn void(&self, id: &str) -> Result<GatewayResult<Transaction>, GatewayError> {
        validate_id(IdKind::Transaction, id)?;
        let tree = self.http.put(&format!("/transactions/{id}/void"), None).await?;
        verify_gateway_response(tree, "transaction")
    }

    /// Submit an authorized transaction for settlement, optionally for a
    /// lower amount.
    pub async fn submit_for_settlement(
        &self,
        id: &str,
        amount: Option<&str>,
    ) -> Result<GatewayResult<Transaction>, GatewayError> {
        validate_id(IdKind::Transaction, id)?;
        let params = amount.map(|amount| {
            let mut inner = Attributes::new();
            inner.insert("amount".into(), Value::String(amount.into()));
            rooted("transaction", inner)
        });
        let tree = self
            .http
            .put(&format!("/transactions/{id}/submit_for_settlement"), params.as_ref())
            .await?;
        verify_gateway_response(tree, "transaction")
    }

    /// Refund a settled transaction. The result holds the new credit.
    pub async fn refund(&self, id: &str) -> Result<GatewayResult<Transaction>, GatewayError> {
        validate_id(IdKind::Transaction, id)?;
        let tree = self.http.post(&format!("/transactions/{id}/refund"), None).await?;
        verify_gateway_response(tree, "transaction")
    }

    /// Ids of the transactions matching `search`.
    pub async fn search(&self, search: &TransactionSearch) -> Result<ResourceCollection, GatewayError> {
        let params = rooted("search", search.criteria().clone());
        let tree = self
            .http
            .post("/transactions/advanced_search_ids", Some(&params))
            .await?;
        ResourceCollection::from_response(tree)
    }

    /// Fetch one page of transactions matching `search`, restricted to `ids`.
    pub async fn fetch(&self, search: &TransactionSearch, ids: &[String]) -> Result<Vec<Transaction>, GatewayError> {
        let criteria = search.clone().with(TransactionSearch::ids().in_list(ids.iter().cloned()));
        let params = rooted("search", criteria.criteria().clone());
        let tree = self
            .http
            .post("/transactions/advanced_search", Some(&params))
            .await?
            .unwrap_or(Value::Null);
        extract_array(&tree, "creditCardTransactions", "transaction")
            .iter()
            .map(|item| decode("transaction", item))
            .collect()
    }

    /// Run `search` and fetch every page.
    pub async fn collect(&self, search: &TransactionSearch) -> Result<Vec<Transaction>, GatewayError> {
        let collection = self.search(search).await?;
        let mut all = Vec::with_capacity(collection.maximum_count());
        for page in collection.pages() {
            all.extend(self.fetch(search, page).await?);
        }
        tracing::debug!(count = all.len(), "collected transaction search results");
        Ok(all)
    }
}
