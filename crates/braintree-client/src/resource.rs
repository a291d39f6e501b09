//! Behavior shared by the gateway value objects and the resource clients.

use std::collections::BTreeMap;
use std::fmt;

use braintree_core::naming::implode_associative;
use braintree_core::Attributes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// Deserialize `null` or `""` as the type's default. The decoder emits
/// `null` for `nil="true"` elements and `""` for empty ones, neither of which
/// plain `#[serde(default)]` covers.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::String(s) if s.is_empty() => Ok(T::default()),
        other => serde_json::from_value(other).map_err(serde::de::Error::custom),
    }
}

/// Deserialize merchant custom fields. A field sent back `nil="true"` reads
/// as an empty string; scalars other than strings keep their text.
pub(crate) fn custom_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::String(s) if s.is_empty() => Ok(BTreeMap::new()),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| match value {
                Value::Null => Ok((key, String::new())),
                Value::String(s) => Ok((key, s)),
                Value::Bool(_) | Value::Number(_) => Ok((key, value.to_string())),
                other => Err(serde::de::Error::custom(format!(
                    "custom field {key} is not a scalar: {other}"
                ))),
            })
            .collect(),
        other => Err(serde::de::Error::custom(format!("expected custom fields, got {other}"))),
    }
}

/// Accept a caller's attribute tree. `null` is treated as no attributes.
pub(crate) fn attributes_of(value: &Value) -> Result<Attributes, GatewayError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Attributes::new()),
        other => Err(GatewayError::InvalidArgument(format!(
            "attributes must be an object, got {other}"
        ))),
    }
}

/// Wrap `inner` under a single root key, the shape every request body takes.
pub(crate) fn rooted(root: &str, inner: Attributes) -> Attributes {
    let mut params = Attributes::new();
    params.insert(root.to_string(), Value::Object(inner));
    params
}

/// Attach `message` to a bare 404.
pub(crate) fn not_found_as(message: String) -> impl FnOnce(GatewayError) -> GatewayError {
    move |e| match e {
        GatewayError::NotFound { message: None } => GatewayError::NotFound {
            message: Some(message),
        },
        other => other,
    }
}

fn printable(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(printable).collect::<Vec<_>>().join(", "),
        Value::Object(map) => format!(
            "[{}]",
            implode_associative(map.iter().map(|(k, v)| (k, printable(v))), "=", ", ")
                .unwrap_or_default()
        ),
        other => other.to_string(),
    }
}

/// Render a value object as `Name[key=value, ...]` using its camelCase
/// serialized fields.
pub(crate) fn write_display<T: Serialize>(f: &mut fmt::Formatter<'_>, name: &str, object: &T) -> fmt::Result {
    let fields = match serde_json::to_value(object) {
        Ok(Value::Object(map)) => map,
        _ => return write!(f, "{name}[]"),
    };
    let body = implode_associative(fields.iter().map(|(k, v)| (k, printable(v))), "=", ", ")
        .unwrap_or_default();
    write!(f, "{name}[{body}]")
}
