//! Vault customers.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/customers` | Create |
//! | GET    | `/customers/{id}` | Find |
//! | PUT    | `/customers/{id}` | Update |
//! | DELETE | `/customers/{id}` | Delete |
//! | POST   | `/customers/advanced_search_ids` | All ids |
//! | POST   | `/customers/advanced_search` | Fetch a page |
//!
//! Sales and credits against a customer's default card go through
//! [`TransactionClient`] with `customerId` filled in.

use std::collections::BTreeMap;
use std::fmt;

use braintree_core::{validate_id, verify_keys, Attributes, IdKind, Signature, SignatureNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::Address;
use crate::collection::ResourceCollection;
use crate::credit_card::CreditCard;
use crate::error::GatewayError;
use crate::http::GatewayHttp;
use crate::resource::{attributes_of, custom_fields, not_found_as, nullable, rooted, write_display};
use crate::result::{decode, expect_resource, verify_gateway_response, GatewayResult};
use crate::transaction::{Transaction, TransactionClient};
use crate::transparent_redirect::parse_and_validate_query_string;
use crate::xml::extract_array;

/// A customer stored in the vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
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
    #[serde(default, deserialize_with = "nullable")]
    pub addresses: Vec<Address>,
    #[serde(default, deserialize_with = "nullable")]
    pub credit_cards: Vec<CreditCard>,
    #[serde(default, deserialize_with = "custom_fields")]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Whether `other` is the same vault customer.
    pub fn same_id(&self, other: &Customer) -> bool {
        self.id == other.id
    }

    /// The customer's default card, if any.
    pub fn default_credit_card(&self) -> Option<&CreditCard> {
        self.credit_cards.iter().find(|c| c.default)
    }

    fn base_signature(credit_card: Signature) -> Signature {
        Signature::new()
            .keys(["id", "company", "email", "fax", "firstName", "lastName", "phone", "website"])
            .nested("creditCard", credit_card)
            .nested("customFields", Signature::new().any_key())
    }

    /// Keys accepted when creating a customer. The embedded card cannot name
    /// a `customerId`; the new customer owns it.
    pub fn create_signature() -> Signature {
        Self::base_signature(CreditCard::create_signature().without_key("customerId"))
    }

    /// Keys accepted when updating a customer. The embedded card may ask to
    /// update an existing token.
    pub fn update_signature() -> Signature {
        let mut credit_card = CreditCard::update_signature();
        credit_card.push_into(&["options"], SignatureNode::Key("updateExistingToken".into()));
        Self::base_signature(credit_card)
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_display(f, "Customer", self)
    }
}

/// Client for vault customers.
#[derive(Debug, Clone)]
pub struct CustomerClient {
    http: GatewayHttp,
    transactions: TransactionClient,
}

impl CustomerClient {
    pub(crate) fn new(http: GatewayHttp, transactions: TransactionClient) -> Self {
        Self { http, transactions }
    }

    /// Create a customer.
    pub async fn create(&self, attributes: &Value) -> Result<GatewayResult<Customer>, GatewayError> {
        let attrs = attributes_of(attributes)?;
        verify_keys(&Customer::create_signature(), &attrs)?;
        let tree = self.http.post("/customers", Some(&rooted("customer", attrs))).await?;
        verify_gateway_response(tree, "customer")
    }

    /// [`create`](Self::create), failing on validation errors.
    pub async fn create_no_validate(&self, attributes: &Value) -> Result<Customer, GatewayError> {
        self.create(attributes).await?.into_resource()
    }

    /// Look up a customer.
    pub async fn find(&self, id: &str) -> Result<Customer, GatewayError> {
        validate_id(IdKind::Customer, id)?;
        let tree = self
            .http
            .get(&format!("/customers/{id}"))
            .await
            .map_err(not_found_as(format!("customer with id {id} not found")))?;
        expect_resource(tree, "customer")
    }

    /// Update a customer.
    pub async fn update(&self, id: &str, attributes: &Value) -> Result<GatewayResult<Customer>, GatewayError> {
        let attrs = attributes_of(attributes)?;
        verify_keys(&Customer::update_signature(), &attrs)?;
        validate_id(IdKind::Customer, id)?;
        let tree = self
            .http
            .put(&format!("/customers/{id}"), Some(&rooted("customer", attrs)))
            .await?;
        verify_gateway_response(tree, "customer")
    }

    /// [`update`](Self::update), failing on validation errors.
    pub async fn update_no_validate(&self, id: &str, attributes: &Value) -> Result<Customer, GatewayError> {
        self.update(id, attributes).await?.into_resource()
    }

    /// Delete a customer with its addresses and cards.
    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        validate_id(IdKind::Customer, id)?;
        self.http.delete(&format!("/customers/{id}")).await?;
        Ok(())
    }

    fn with_customer_id(id: &str, transaction: &Value) -> Result<Value, GatewayError> {
        validate_id(IdKind::Customer, id)?;
        let mut attrs: Attributes = attributes_of(transaction)?;
        attrs.insert("customerId".into(), Value::String(id.to_string()));
        Ok(Value::Object(attrs))
    }

    /// Charge the customer's default card.
    pub async fn sale(&self, id: &str, transaction: &Value) -> Result<GatewayResult<Transaction>, GatewayError> {
        let attrs = Self::with_customer_id(id, transaction)?;
        self.transactions.sale(&attrs).await
    }

    /// [`sale`](Self::sale), failing on validation errors.
    pub async fn sale_no_validate(&self, id: &str, transaction: &Value) -> Result<Transaction, GatewayError> {
        self.sale(id, transaction).await?.into_resource()
    }

    /// Credit the customer's default card.
    pub async fn credit(&self, id: &str, transaction: &Value) -> Result<GatewayResult<Transaction>, GatewayError> {
        let attrs = Self::with_customer_id(id, transaction)?;
        self.transactions.credit(&attrs).await
    }

    /// [`credit`](Self::credit), failing on validation errors.
    pub async fn credit_no_validate(&self, id: &str, transaction: &Value) -> Result<Transaction, GatewayError> {
        self.credit(id, transaction).await?.into_resource()
    }

    /// Ids of every customer in the vault.
    pub async fn all(&self) -> Result<ResourceCollection, GatewayError> {
        let tree = self.http.post("/customers/advanced_search_ids", None).await?;
        ResourceCollection::from_response(tree)
    }

    /// Fetch the customers with the given ids.
    pub async fn fetch(&self, ids: &[String]) -> Result<Vec<Customer>, GatewayError> {
        let mut search = Attributes::new();
        search.insert(
            "ids".into(),
            Value::Array(ids.iter().cloned().map(Value::String).collect()),
        );
        let tree = self
            .http
            .post("/customers/advanced_search", Some(&rooted("search", search)))
            .await?
            .unwrap_or(Value::Null);
        extract_array(&tree, "customers", "customer")
            .iter()
            .map(|item| decode("customer", item))
            .collect()
    }

    /// Fetch every customer in `collection`, a page at a time.
    pub async fn collect(&self, collection: &ResourceCollection) -> Result<Vec<Customer>, GatewayError> {
        let mut all = Vec::with_capacity(collection.maximum_count());
        for page in collection.pages() {
            all.extend(self.fetch(page).await?);
        }
        Ok(all)
    }

    /// Form action for creating a customer by transparent redirect.
    #[deprecated(note = "use TransparentRedirectClient::url")]
    pub fn create_customer_url(&self) -> String {
        format!(
            "{}/customers/all/create_via_transparent_redirect_request",
            self.http.merchant_url()
        )
    }

    /// Form action for updating a customer by transparent redirect.
    #[deprecated(note = "use TransparentRedirectClient::url")]
    pub fn update_customer_url(&self) -> String {
        format!(
            "{}/customers/all/update_via_transparent_redirect_request",
            self.http.merchant_url()
        )
    }

    async fn confirm_redirect(&self, query_string: &str) -> Result<GatewayResult<Customer>, GatewayError> {
        let params = parse_and_validate_query_string(self.http.private_key(), query_string)?;
        let id = params.get("id").cloned().unwrap_or_default();
        let mut body = Attributes::new();
        body.insert("id".into(), Value::String(id));
        let tree = self
            .http
            .post("/customers/all/confirm_transparent_redirect_request", Some(&body))
            .await?;
        verify_gateway_response(tree, "customer")
    }

    /// Confirm a create-customer transparent redirect.
    #[deprecated(note = "use TransparentRedirectClient::confirm")]
    pub async fn create_from_transparent_redirect(
        &self,
        query_string: &str,
    ) -> Result<GatewayResult<Customer>, GatewayError> {
        tracing::warn!("create_from_transparent_redirect is deprecated, use TransparentRedirectClient::confirm");
        self.confirm_redirect(query_string).await
    }

    /// Confirm an update-customer transparent redirect.
    #[deprecated(note = "use TransparentRedirectClient::confirm")]
    pub async fn update_from_transparent_redirect(
        &self,
        query_string: &str,
    ) -> Result<GatewayResult<Customer>, GatewayError> {
        tracing::warn!("update_from_transparent_redirect is deprecated, use TransparentRedirectClient::confirm");
        self.confirm_redirect(query_string).await
    }
}
