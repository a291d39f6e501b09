//! Gateway client error types.

use braintree_core::{InvalidIdError, InvalidKeysError};

use crate::result::ValidationErrorCollection;

/// Errors from gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP 401: the public/private key pair was rejected.
    #[error("authentication failed")]
    Authentication,
    /// HTTP 403: the credentials lack permission for this call.
    #[error("not authorized{}", fmt_detail(.message))]
    Authorization { message: Option<String> },
    /// HTTP 404.
    #[error("not found{}", fmt_detail(.message))]
    NotFound { message: Option<String> },
    /// HTTP 426: this client library version is no longer accepted.
    #[error("client library upgrade required")]
    UpgradeRequired,
    /// HTTP 500.
    #[error("gateway server error")]
    ServerError,
    /// HTTP 503.
    #[error("gateway is down for maintenance")]
    DownForMaintenance,
    /// Any other status, or a response of unexpected shape.
    #[error("unexpected gateway response: {message}")]
    Unexpected { message: String },
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response body was not well-formed gateway XML.
    #[error("failed to decode XML from {endpoint}: {message}")]
    Xml { endpoint: String, message: String },
    /// The decoded response did not fit the typed value object.
    #[error("failed to deserialize {resource}: {source}")]
    Deserialization {
        resource: String,
        source: serde_json::Error,
    },
    /// Attribute keys rejected by the request signature; nothing was sent.
    #[error(transparent)]
    InvalidKeys(#[from] InvalidKeysError),
    /// A resource id was missing or malformed; nothing was sent.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
    /// A caller argument had the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The gateway answered with validation errors where a resource was required.
    #[error("validations failed: {message}")]
    ValidationsFailed {
        message: String,
        errors: ValidationErrorCollection,
    },
    /// A transparent redirect query string was forged, truncated or malformed.
    #[error("transparent redirect rejected: {reason}")]
    TransparentRedirect { reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

fn fmt_detail(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {m}"),
        _ => String::new(),
    }
}

impl GatewayError {
    /// Map a non-success HTTP status to its error.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::Authentication,
            403 => Self::Authorization { message },
            404 => Self::NotFound { message },
            426 => Self::UpgradeRequired,
            500 => Self::ServerError,
            503 => Self::DownForMaintenance,
            other => Self::Unexpected {
                message: format!("Unexpected HTTP_RESPONSE #{other}"),
            },
        }
    }

    /// Whether this is a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
