//! Customer addresses.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/customers/{customer_id}/addresses` | Create |
//! | GET    | `/customers/{customer_id}/addresses/{id}` | Find |
//! | PUT    | `/customers/{customer_id}/addresses/{id}` | Update |
//! | DELETE | `/customers/{customer_id}/addresses/{id}` | Delete |

use std::fmt;

use braintree_core::{validate_id, verify_keys, IdKind, InvalidIdError, Signature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;
use crate::http::GatewayHttp;
use crate::resource::{attributes_of, not_found_as, nullable, rooted, write_display};
use crate::result::{expect_resource, verify_gateway_response, GatewayResult};

/// An address stored on a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable")]
    pub street_address: String,
    #[serde(default, deserialize_with = "nullable")]
    pub extended_address: String,
    #[serde(default, deserialize_with = "nullable")]
    pub locality: String,
    #[serde(default, deserialize_with = "nullable")]
    pub region: String,
    #[serde(default, deserialize_with = "nullable")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub country_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Address {
    /// Whether `other` is the same stored address.
    pub fn same_id(&self, other: &Address) -> bool {
        self.id == other.id && self.customer_id == other.customer_id
    }

    /// Keys accepted when updating an address, and for billing addresses
    /// nested in credit card requests.
    pub fn update_signature() -> Signature {
        Signature::new().keys([
            "company",
            "countryName",
            "extendedAddress",
            "firstName",
            "lastName",
            "locality",
            "postalCode",
            "region",
            "streetAddress",
        ])
    }

    /// Keys accepted when creating an address: the update keys plus the
    /// owning `customerId`.
    pub fn create_signature() -> Signature {
        Self::update_signature().key("customerId")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_display(f, "Address", self)
    }
}

fn addresses_path(customer_id: &str) -> String {
    format!("/customers/{customer_id}/addresses")
}

fn validate_pair(customer_id: &str, address_id: &str) -> Result<(), InvalidIdError> {
    validate_id(IdKind::Customer, customer_id)?;
    validate_id(IdKind::Address, address_id)
}

/// Client for customer addresses.
#[derive(Debug, Clone)]
pub struct AddressClient {
    http: GatewayHttp,
}

impl AddressClient {
    pub(crate) fn new(http: GatewayHttp) -> Self {
        Self { http }
    }

    /// Create an address. `attributes` must name the owner in `customerId`;
    /// that key goes into the path and is not sent in the body.
    pub async fn create(&self, attributes: &Value) -> Result<GatewayResult<Address>, GatewayError> {
        let mut attrs = attributes_of(attributes)?;
        verify_keys(&Address::create_signature(), &attrs)?;
        let customer_id = match attrs.remove("customerId") {
            Some(Value::String(id)) => id,
            _ => {
                return Err(InvalidIdError::Missing {
                    kind: IdKind::Customer.label().to_string(),
                }
                .into())
            }
        };
        validate_id(IdKind::Customer, &customer_id)?;

        let tree = self
            .http
            .post(&addresses_path(&customer_id), Some(&rooted("address", attrs)))
            .await?;
        verify_gateway_response(tree, "address")
    }

    /// [`create`](Self::create), failing on validation errors.
    pub async fn create_no_validate(&self, attributes: &Value) -> Result<Address, GatewayError> {
        self.create(attributes).await?.into_resource()
    }

    /// Look up an address.
    pub async fn find(&self, customer_id: &str, address_id: &str) -> Result<Address, GatewayError> {
        validate_pair(customer_id, address_id)?;
        let tree = self
            .http
            .get(&format!("{}/{address_id}", addresses_path(customer_id)))
            .await
            .map_err(not_found_as(format!(
                "address for customer {customer_id} with id {address_id} not found"
            )))?;
        expect_resource(tree, "address")
    }

    /// Update an address.
    pub async fn update(
        &self,
        customer_id: &str,
        address_id: &str,
        attributes: &Value,
    ) -> Result<GatewayResult<Address>, GatewayError> {
        let attrs = attributes_of(attributes)?;
        verify_keys(&Address::update_signature(), &attrs)?;
        validate_pair(customer_id, address_id)?;
        let tree = self
            .http
            .put(
                &format!("{}/{address_id}", addresses_path(customer_id)),
                Some(&rooted("address", attrs)),
            )
            .await?;
        verify_gateway_response(tree, "address")
    }

    /// [`update`](Self::update), failing on validation errors.
    pub async fn update_no_validate(
        &self,
        customer_id: &str,
        address_id: &str,
        attributes: &Value,
    ) -> Result<Address, GatewayError> {
        self.update(customer_id, address_id, attributes).await?.into_resource()
    }

    /// Delete an address.
    pub async fn delete(&self, customer_id: &str, address_id: &str) -> Result<(), GatewayError> {
        validate_pair(customer_id, address_id)?;
        self.http
            .delete(&format!("{}/{address_id}", addresses_path(customer_id)))
            .await?;
        Ok(())
    }
}
