//! # Gateway Results
//!
//! Mutating gateway calls answer with either the resource or an
//! `api-error-response` document. [`verify_gateway_response`] tells the two
//! apart and produces a [`GatewayResult`]; the error side carries a
//! [`ValidationErrorCollection`] that mirrors the nesting of the request
//! (`customer` → `creditCard` → `billingAddress`).

use std::collections::BTreeMap;

use braintree_core::naming::delimiter_to_camel_case;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::credit_card::CreditCardVerification;
use crate::error::GatewayError;
use crate::transaction::Transaction;

/// Numeric validation error codes returned by the gateway.
pub mod error_codes {
    #![allow(missing_docs)]

    pub const ADDRESS_CANNOT_BE_BLANK: &str = "81801";
    pub const ADDRESS_COMPANY_IS_TOO_LONG: &str = "81802";
    pub const ADDRESS_COUNTRY_NAME_IS_NOT_ACCEPTED: &str = "91803";
    pub const ADDRESS_EXTENDED_ADDRESS_IS_TOO_LONG: &str = "81804";
    pub const ADDRESS_FIRST_NAME_IS_TOO_LONG: &str = "81805";
    pub const ADDRESS_LAST_NAME_IS_TOO_LONG: &str = "81806";
    pub const ADDRESS_LOCALITY_IS_TOO_LONG: &str = "81807";
    pub const ADDRESS_POSTAL_CODE_IS_REQUIRED: &str = "81808";
    pub const ADDRESS_POSTAL_CODE_IS_TOO_LONG: &str = "81809";
    pub const ADDRESS_REGION_IS_TOO_LONG: &str = "81810";
    pub const ADDRESS_STREET_ADDRESS_IS_REQUIRED: &str = "81811";
    pub const ADDRESS_STREET_ADDRESS_IS_TOO_LONG: &str = "81812";

    pub const CREDIT_CARD_CARDHOLDER_NAME_IS_TOO_LONG: &str = "81723";
    pub const CREDIT_CARD_CREDIT_CARD_TYPE_IS_NOT_ACCEPTED: &str = "81703";
    pub const CREDIT_CARD_CUSTOMER_ID_IS_REQUIRED: &str = "91704";
    pub const CREDIT_CARD_CUSTOMER_ID_IS_INVALID: &str = "91705";
    pub const CREDIT_CARD_CVV_IS_REQUIRED: &str = "81706";
    pub const CREDIT_CARD_CVV_IS_INVALID: &str = "81707";
    pub const CREDIT_CARD_EXPIRATION_DATE_CONFLICT: &str = "91708";
    pub const CREDIT_CARD_EXPIRATION_DATE_IS_REQUIRED: &str = "81709";
    pub const CREDIT_CARD_EXPIRATION_DATE_IS_INVALID: &str = "81710";
    pub const CREDIT_CARD_EXPIRATION_DATE_YEAR_IS_INVALID: &str = "81711";
    pub const CREDIT_CARD_EXPIRATION_MONTH_IS_INVALID: &str = "81712";
    pub const CREDIT_CARD_EXPIRATION_YEAR_IS_INVALID: &str = "81713";
    pub const CREDIT_CARD_NUMBER_INVALID_LENGTH: &str = "81716";
    pub const CREDIT_CARD_NUMBER_IS_INVALID: &str = "81715";
    pub const CREDIT_CARD_NUMBER_IS_REQUIRED: &str = "81714";
    pub const CREDIT_CARD_NUMBER_MUST_BE_TEST_NUMBER: &str = "81717";
    pub const CREDIT_CARD_TOKEN_INVALID: &str = "91718";
    pub const CREDIT_CARD_TOKEN_IS_IN_USE: &str = "91719";
    pub const CREDIT_CARD_TOKEN_IS_TOO_LONG: &str = "91720";

    pub const CUSTOMER_COMPANY_IS_TOO_LONG: &str = "81601";
    pub const CUSTOMER_CUSTOM_FIELD_IS_INVALID: &str = "91602";
    pub const CUSTOMER_CUSTOM_FIELD_IS_TOO_LONG: &str = "81603";
    pub const CUSTOMER_EMAIL_IS_INVALID: &str = "81604";
    pub const CUSTOMER_EMAIL_IS_TOO_LONG: &str = "81605";
    pub const CUSTOMER_EMAIL_IS_REQUIRED: &str = "81606";
    pub const CUSTOMER_FAX_IS_TOO_LONG: &str = "81607";
    pub const CUSTOMER_FIRST_NAME_IS_TOO_LONG: &str = "81608";
    pub const CUSTOMER_ID_IS_INVALID: &str = "91610";
    pub const CUSTOMER_ID_IS_IN_USE: &str = "91609";
    pub const CUSTOMER_ID_IS_NOT_ALLOWED: &str = "91611";
    pub const CUSTOMER_ID_IS_TOO_LONG: &str = "91612";
    pub const CUSTOMER_LAST_NAME_IS_TOO_LONG: &str = "81613";
    pub const CUSTOMER_PHONE_IS_TOO_LONG: &str = "81614";
    pub const CUSTOMER_WEBSITE_IS_INVALID: &str = "81616";
    pub const CUSTOMER_WEBSITE_IS_TOO_LONG: &str = "81615";

    pub const TRANSACTION_AMOUNT_CANNOT_BE_NEGATIVE: &str = "81501";
    pub const TRANSACTION_AMOUNT_IS_REQUIRED: &str = "81502";
    pub const TRANSACTION_AMOUNT_IS_INVALID: &str = "81503";
    pub const TRANSACTION_AMOUNT_IS_TOO_LARGE: &str = "81528";
    pub const TRANSACTION_CANNOT_BE_VOIDED: &str = "91504";
    pub const TRANSACTION_CANNOT_REFUND_CREDIT: &str = "91505";
    pub const TRANSACTION_CANNOT_REFUND_UNLESS_SETTLED: &str = "91506";
    pub const TRANSACTION_CANNOT_SUBMIT_FOR_SETTLEMENT: &str = "91507";
    pub const TRANSACTION_CREDIT_CARD_IS_REQUIRED: &str = "91508";
    pub const TRANSACTION_CUSTOMER_DEFAULT_PAYMENT_METHOD_CARD_TYPE_IS_NOT_ACCEPTED: &str = "81509";
    pub const TRANSACTION_CUSTOMER_ID_IS_INVALID: &str = "91510";
    pub const TRANSACTION_CUSTOMER_DOES_NOT_HAVE_CREDIT_CARD: &str = "91511";
    pub const TRANSACTION_HAS_ALREADY_BEEN_REFUNDED: &str = "91512";
    pub const TRANSACTION_MERCHANT_ACCOUNT_NAME_IS_INVALID: &str = "91513";
    pub const TRANSACTION_MERCHANT_ACCOUNT_IS_SUSPENDED: &str = "91514";
    pub const TRANSACTION_ORDER_ID_IS_TOO_LONG: &str = "91501";
    pub const TRANSACTION_PAYMENT_METHOD_CONFLICT: &str = "91515";
    pub const TRANSACTION_PAYMENT_METHOD_DOES_NOT_BELONG_TO_CUSTOMER: &str = "91516";
    pub const TRANSACTION_PAYMENT_METHOD_TOKEN_CARD_TYPE_IS_NOT_ACCEPTED: &str = "91517";
    pub const TRANSACTION_PAYMENT_METHOD_TOKEN_IS_INVALID: &str = "91518";
    pub const TRANSACTION_PROCESSOR_AUTHORIZATION_CODE_CANNOT_BE_SET: &str = "91519";
    pub const TRANSACTION_PROCESSOR_AUTHORIZATION_CODE_IS_INVALID: &str = "81520";
    pub const TRANSACTION_REFUND_AMOUNT_IS_TOO_LARGE: &str = "91521";
    pub const TRANSACTION_SETTLEMENT_AMOUNT_IS_TOO_LARGE: &str = "91522";
    pub const TRANSACTION_TYPE_IS_INVALID: &str = "91523";
    pub const TRANSACTION_TYPE_IS_REQUIRED: &str = "91524";
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Offending attribute, camelCased (`firstName`).
    pub attribute: String,
    /// Gateway error code; see [`error_codes`].
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| match value.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            attribute: delimiter_to_camel_case(&text("attribute")),
            code: text("code"),
            message: text("message"),
        }
    }
}

/// Validation errors at one level of the request, plus nested levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorCollection {
    errors: Vec<ValidationError>,
    nested: BTreeMap<String, ValidationErrorCollection>,
}

impl ValidationErrorCollection {
    /// Build from a decoded `errors` element.
    ///
    /// The `errors` key at each level holds that level's list; every other
    /// object-valued key is a nested level.
    pub fn from_value(value: &Value) -> Self {
        let mut collection = Self::default();
        let Value::Object(map) = value else {
            return collection;
        };
        for (key, child) in map {
            match (key.as_str(), child) {
                ("errors", Value::Array(items)) => {
                    collection.errors = items.iter().map(ValidationError::from_value).collect();
                }
                ("errors", Value::Object(_)) => {
                    // A lone <error> without type="array".
                    let items = crate::xml::extract_array(value, "errors", "error");
                    collection.errors = items.iter().map(ValidationError::from_value).collect();
                }
                (_, Value::Object(_)) => {
                    collection.nested.insert(key.clone(), Self::from_value(child));
                }
                _ => {}
            }
        }
        collection
    }

    /// The nested level for `key`, e.g. `customer` or `creditCard`.
    pub fn for_key(&self, key: &str) -> Option<&ValidationErrorCollection> {
        self.nested.get(key)
    }

    /// Errors at this level for `attribute`.
    pub fn on_attribute(&self, attribute: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.attribute == attribute).collect()
    }

    /// Errors at this level only.
    pub fn shallow_all(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Errors at this level and every nested level.
    pub fn deep_all(&self) -> Vec<&ValidationError> {
        let mut all: Vec<&ValidationError> = self.errors.iter().collect();
        for child in self.nested.values() {
            all.extend(child.deep_all());
        }
        all
    }

    /// Number of errors at this level and below.
    pub fn deep_size(&self) -> usize {
        self.errors.len() + self.nested.values().map(Self::deep_size).sum::<usize>()
    }

    /// Whether there are no errors anywhere.
    pub fn is_empty(&self) -> bool {
        self.deep_size() == 0
    }
}

/// The error side of a gateway result.
#[derive(Debug, Clone)]
pub struct ErrorResult {
    /// Validation errors, nested like the request.
    pub errors: ValidationErrorCollection,
    /// Parameters the gateway received, echoed back.
    pub params: Value,
    /// Summary message.
    pub message: String,
    /// Failed card verification, when the request asked for one.
    pub credit_card_verification: Option<CreditCardVerification>,
    /// The declined or rejected transaction, when one was created.
    pub transaction: Option<Transaction>,
}

impl ErrorResult {
    /// Build from a decoded `api-error-response` element.
    pub fn from_value(value: &Value) -> Result<Self, GatewayError> {
        let errors = value
            .get("errors")
            .map(ValidationErrorCollection::from_value)
            .unwrap_or_default();
        let message = match value.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        Ok(Self {
            errors,
            params: value.get("params").cloned().unwrap_or(Value::Null),
            message,
            credit_card_verification: decode_optional(value, "creditCardVerification")?,
            transaction: decode_optional(value, "transaction")?,
        })
    }
}

fn decode_optional<T: DeserializeOwned>(value: &Value, key: &str) -> Result<Option<T>, GatewayError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(inner) => decode(key, inner).map(Some),
    }
}

/// Deserialize a decoded resource element into its value object.
pub(crate) fn decode<T: DeserializeOwned>(resource: &str, value: &Value) -> Result<T, GatewayError> {
    serde_json::from_value(value.clone()).map_err(|e| GatewayError::Deserialization {
        resource: resource.to_string(),
        source: e,
    })
}

/// The resource under `key` of a lookup response.
pub(crate) fn expect_resource<T: DeserializeOwned>(tree: Option<Value>, key: &str) -> Result<T, GatewayError> {
    match tree.as_ref().and_then(|t| t.get(key)) {
        Some(resource) => decode(key, resource),
        None => Err(GatewayError::Unexpected {
            message: format!("Expected {key}"),
        }),
    }
}

/// Outcome of a mutating gateway call.
#[derive(Debug, Clone)]
pub enum GatewayResult<T> {
    /// The gateway accepted the request.
    Successful(T),
    /// The gateway rejected the request.
    Error(ErrorResult),
}

impl<T> GatewayResult<T> {
    /// Whether the request was accepted.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Successful(_))
    }

    /// The resource, if the request was accepted.
    pub fn resource(&self) -> Option<&T> {
        match self {
            Self::Successful(resource) => Some(resource),
            Self::Error(_) => None,
        }
    }

    /// The error result, if the request was rejected.
    pub fn error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Successful(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// The resource, or [`GatewayError::ValidationsFailed`].
    pub fn into_resource(self) -> Result<T, GatewayError> {
        match self {
            Self::Successful(resource) => Ok(resource),
            Self::Error(error) => Err(GatewayError::ValidationsFailed {
                message: error.message,
                errors: error.errors,
            }),
        }
    }
}

/// Classify a decoded response as the resource under `key` or an
/// `apiErrorResponse`.
///
/// # Errors
///
/// [`GatewayError::Unexpected`] when the response holds neither.
pub fn verify_gateway_response<T: DeserializeOwned>(
    tree: Option<Value>,
    key: &str,
) -> Result<GatewayResult<T>, GatewayError> {
    let tree = tree.unwrap_or(Value::Null);
    if let Some(resource) = tree.get(key) {
        return decode(key, resource).map(GatewayResult::Successful);
    }
    if let Some(error) = tree.get("apiErrorResponse") {
        return ErrorResult::from_value(error).map(GatewayResult::Error);
    }
    Err(GatewayError::Unexpected {
        message: format!("Expected {key} or apiErrorResponse"),
    })
}
