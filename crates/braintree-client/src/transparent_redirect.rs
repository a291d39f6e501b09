//! # Transparent Redirect
//!
//! A browser form posts card data straight to the gateway, which redirects
//! back to the merchant with a signed query string. The merchant never sees
//! the card number.
//!
//! 1. The merchant renders a form with a hidden `tr_data` field produced by
//!    one of the `*_data` builders. `tr_data` is `{digest}|{query}`, where the
//!    query carries the merchant's fixed parameters and the digest is the
//!    HMAC-SHA1 of the query under the private key.
//! 2. The form posts to [`TransparentRedirectClient::url`].
//! 3. The gateway redirects to `redirectUrl` with `http_status`, `id`,
//!    `kind` and a trailing `hash`.
//! 4. The merchant calls [`TransparentRedirectClient::confirm`] with that
//!    query string to validate it and fetch the result.

use std::collections::BTreeMap;

use braintree_core::naming::camel_case_to_delimiter;
use braintree_core::{hex_digest, verify_hex_digest, verify_keys, Attributes, Signature};
use chrono::Utc;
use serde_json::Value;

use crate::credit_card::CreditCard;
use crate::customer::Customer;
use crate::error::GatewayError;
use crate::http::{GatewayHttp, API_VERSION};
use crate::resource::attributes_of;
use crate::result::{verify_gateway_response, GatewayResult};
use crate::transaction::Transaction;

/// What a transparent redirect request creates or updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectKind {
    CreateCustomer,
    UpdateCustomer,
    CreatePaymentMethod,
    UpdatePaymentMethod,
    CreateTransaction,
}

impl RedirectKind {
    /// Wire value of the `kind` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateCustomer => "create_customer",
            Self::UpdateCustomer => "update_customer",
            Self::CreatePaymentMethod => "create_payment_method",
            Self::UpdatePaymentMethod => "update_payment_method",
            Self::CreateTransaction => "create_transaction",
        }
    }

    /// Parse a `kind` parameter.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "create_customer" => Some(Self::CreateCustomer),
            "update_customer" => Some(Self::UpdateCustomer),
            "create_payment_method" => Some(Self::CreatePaymentMethod),
            "update_payment_method" => Some(Self::UpdatePaymentMethod),
            "create_transaction" => Some(Self::CreateTransaction),
            _ => None,
        }
    }
}

/// Result of confirming a transparent redirect.
#[derive(Debug, Clone)]
pub enum ConfirmResult {
    Customer(GatewayResult<Customer>),
    CreditCard(GatewayResult<CreditCard>),
    Transaction(GatewayResult<Transaction>),
}

impl ConfirmResult {
    /// Whether the gateway accepted the redirected request.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Customer(r) => r.is_success(),
            Self::CreditCard(r) => r.is_success(),
            Self::Transaction(r) => r.is_success(),
        }
    }
}

/// Rewrite every key of a tree from camelCase to snake_case.
fn underscore_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (camel_case_to_delimiter(k, '_'), underscore_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(underscore_keys).collect()),
        other => other.clone(),
    }
}

fn query_pairs(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                query_pairs(format!("{key}[{k}]"), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                query_pairs(format!("{key}[{i}]"), v, out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push((key, s.clone())),
        other => out.push((key, other.to_string())),
    }
}

/// Form-encode a tree with bracketed nested keys, in sorted key order.
pub fn build_query(params: &Attributes) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        query_pairs(key.clone(), value, &mut pairs);
    }
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Validate a redirect query string and return its parameters.
///
/// The hash must be the last parameter and must match the digest of
/// everything before it. Only the signed parameters are returned, plus the
/// hash itself.
///
/// # Errors
///
/// - the status error for a non-200 `http_status`;
/// - [`GatewayError::TransparentRedirect`] when the hash is absent, repeated,
///   followed by other parameters, or does not match.
pub fn parse_and_validate_query_string(
    private_key: &str,
    query_string: &str,
) -> Result<BTreeMap<String, String>, GatewayError> {
    let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
    let (signed, hash) = match query_string.rfind("&hash=") {
        Some(at) => (&query_string[..at], Some(&query_string[at + "&hash=".len()..])),
        None => (query_string, None),
    };
    let mut params: BTreeMap<String, String> = url::form_urlencoded::parse(signed.as_bytes())
        .into_owned()
        .collect();

    if let Some(status) = params.get("http_status") {
        if status != "200" {
            let code = status.parse::<u16>().map_err(|_| GatewayError::Unexpected {
                message: format!("Unexpected HTTP_RESPONSE #{status}"),
            })?;
            return Err(GatewayError::from_status(code, params.get("bt_message").cloned()));
        }
    }

    let rejected = |reason: &str| GatewayError::TransparentRedirect {
        reason: reason.to_string(),
    };
    let hash = hash.ok_or_else(|| rejected("query string has no hash"))?;
    if hash.contains('&') {
        return Err(rejected("hash must be the last query parameter"));
    }
    if params.contains_key("hash") {
        return Err(rejected("query string has more than one hash"));
    }
    verify_hex_digest(private_key, signed, hash).map_err(|e| {
        tracing::warn!("transparent redirect query string failed verification: {e}");
        rejected(&e.to_string())
    })?;

    params.insert("hash".into(), hash.to_string());
    Ok(params)
}

fn require(present: bool, message: &str) -> Result<(), GatewayError> {
    if present {
        Ok(())
    } else {
        Err(GatewayError::InvalidArgument(message.to_string()))
    }
}

fn is_redirect_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Client for transparent redirect data and confirmation.
#[derive(Debug, Clone)]
pub struct TransparentRedirectClient {
    http: GatewayHttp,
}

impl TransparentRedirectClient {
    pub(crate) fn new(http: GatewayHttp) -> Self {
        Self { http }
    }

    /// Form action for every transparent redirect request.
    pub fn url(&self) -> String {
        format!("{}/transparent_redirect_requests", self.http.merchant_url())
    }

    /// `tr_data` for a sale or credit form. `transaction[type]` is required.
    pub fn transaction_data(&self, params: &Value) -> Result<String, GatewayError> {
        let attrs = attributes_of(params)?;
        let signature = Signature::new()
            .key("redirectUrl")
            .nested("transaction", Transaction::create_signature());
        verify_keys(&signature, &attrs)?;
        let transaction_type = attrs
            .get("transaction")
            .and_then(|t| t.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if transaction_type != "sale" && transaction_type != "credit" {
            return Err(GatewayError::InvalidArgument(format!(
                "expected transaction[type] of sale or credit, was: {transaction_type}"
            )));
        }
        self.data(attrs, RedirectKind::CreateTransaction)
    }

    /// `tr_data` for a new-customer form.
    pub fn create_customer_data(&self, params: &Value) -> Result<String, GatewayError> {
        let attrs = attributes_of(params)?;
        let signature = Signature::new()
            .key("redirectUrl")
            .nested("customer", Customer::create_signature());
        verify_keys(&signature, &attrs)?;
        self.data(attrs, RedirectKind::CreateCustomer)
    }

    /// `tr_data` for an edit-customer form. `customerId` is required.
    pub fn update_customer_data(&self, params: &Value) -> Result<String, GatewayError> {
        let attrs = attributes_of(params)?;
        let signature = Signature::new()
            .keys(["redirectUrl", "customerId"])
            .nested("customer", Customer::update_signature());
        verify_keys(&signature, &attrs)?;
        require(attrs.contains_key("customerId"), "expected params to contain customerId of customer to update")?;
        self.data(attrs, RedirectKind::UpdateCustomer)
    }

    /// `tr_data` for a new-card form. `creditCard[customerId]` is required.
    pub fn create_credit_card_data(&self, params: &Value) -> Result<String, GatewayError> {
        let attrs = attributes_of(params)?;
        let signature = Signature::new()
            .key("redirectUrl")
            .nested("creditCard", CreditCard::create_signature());
        verify_keys(&signature, &attrs)?;
        require(
            attrs.get("creditCard").and_then(|c| c.get("customerId")).is_some(),
            "expected params to contain creditCard[customerId]",
        )?;
        self.data(attrs, RedirectKind::CreatePaymentMethod)
    }

    /// `tr_data` for an edit-card form. `paymentMethodToken` is required.
    pub fn update_credit_card_data(&self, params: &Value) -> Result<String, GatewayError> {
        let attrs = attributes_of(params)?;
        let signature = Signature::new()
            .keys(["redirectUrl", "paymentMethodToken"])
            .nested("creditCard", CreditCard::update_signature());
        verify_keys(&signature, &attrs)?;
        require(
            attrs.contains_key("paymentMethodToken"),
            "expected params to contain paymentMethodToken of credit card to update",
        )?;
        self.data(attrs, RedirectKind::UpdatePaymentMethod)
    }

    fn data(&self, mut attrs: Attributes, kind: RedirectKind) -> Result<String, GatewayError> {
        require(attrs.contains_key("redirectUrl"), "expected params to contain redirectUrl")?;
        attrs.insert("time".into(), Value::String(Utc::now().format("%Y%m%d%H%M%S").to_string()));
        attrs.insert("publicKey".into(), Value::String(self.http.public_key().to_string()));
        attrs.insert("apiVersion".into(), Value::String(API_VERSION.to_string()));
        attrs.insert("kind".into(), Value::String(kind.as_str().to_string()));

        let underscored = match underscore_keys(&Value::Object(attrs)) {
            Value::Object(map) => map,
            _ => Attributes::new(),
        };
        let query = build_query(&underscored);
        Ok(format!("{}|{}", hex_digest(self.http.private_key(), &query), query))
    }

    /// Validate a redirect query string with this client's private key.
    pub fn parse_and_validate_query_string(
        &self,
        query_string: &str,
    ) -> Result<BTreeMap<String, String>, GatewayError> {
        parse_and_validate_query_string(self.http.private_key(), query_string)
    }

    /// Validate the redirect and fetch the resulting customer, card or
    /// transaction.
    pub async fn confirm(&self, query_string: &str) -> Result<ConfirmResult, GatewayError> {
        let params = self.parse_and_validate_query_string(query_string)?;
        let unexpected = |message: String| GatewayError::Unexpected { message };
        let kind_param = params.get("kind").map(String::as_str).unwrap_or_default();
        let kind = RedirectKind::parse(kind_param)
            .ok_or_else(|| unexpected(format!("unexpected transparent redirect kind: {kind_param}")))?;
        let id = params
            .get("id")
            .filter(|id| is_redirect_id(id))
            .ok_or_else(|| GatewayError::TransparentRedirect {
                reason: "query string has no valid id".into(),
            })?;

        let tree = self
            .http
            .post(&format!("/transparent_redirect_requests/{id}/confirm"), None)
            .await?;
        Ok(match kind {
            RedirectKind::CreateCustomer | RedirectKind::UpdateCustomer => {
                ConfirmResult::Customer(verify_gateway_response(tree, "customer")?)
            }
            RedirectKind::CreatePaymentMethod | RedirectKind::UpdatePaymentMethod => {
                ConfirmResult::CreditCard(verify_gateway_response(tree, "creditCard")?)
            }
            RedirectKind::CreateTransaction => ConfirmResult::Transaction(verify_gateway_response(tree, "transaction")?),
        })
    }
}
