//! Signed HTTP transport to the gateway.
//!
//! Every request goes to `{merchant_url}{path}` with XML headers, the API
//! version header and HTTP basic auth built from the key pair. Bodies are
//! encoded with [`crate::xml::build_document`] and responses decoded with
//! [`crate::xml::parse`].

use std::time::Duration;

use braintree_core::Attributes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::retry::RetryPolicy;
use crate::xml;

/// Gateway API version sent in `X-ApiVersion`.
pub const API_VERSION: &str = "1";

/// `User-Agent` value for this library version.
pub fn user_agent() -> String {
    format!("Braintree Rust Library {}", env!("CARGO_PKG_VERSION"))
}

/// Authenticated XML transport bound to one merchant.
#[derive(Clone)]
pub struct GatewayHttp {
    http: reqwest::Client,
    merchant_url: String,
    public_key: String,
    private_key: Zeroizing<String>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GatewayHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayHttp")
            .field("merchant_url", &self.merchant_url)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("retry", &self.retry)
            .finish()
    }
}

/// Whether a failed send may be repeated. Reads repeat on any transport
/// failure; writes only when the connection was never made, since a write
/// that timed out may already have been applied.
fn may_resend(method: &Method, err: &reqwest::Error) -> bool {
    matches!(*method, Method::GET | Method::DELETE) || err.is_connect()
}

impl GatewayHttp {
    /// Build the transport from configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        headers.insert("X-ApiVersion", HeaderValue::from_static(API_VERSION));
        let agent = HeaderValue::from_str(&user_agent())
            .map_err(|e| GatewayError::InvalidArgument(format!("user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            merchant_url: config.merchant_url()?,
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    /// `{base_url}/merchants/{merchant_id}`.
    pub fn merchant_url(&self) -> &str {
        &self.merchant_url
    }

    /// Public key of the configured credentials.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub(crate) fn private_key(&self) -> &str {
        self.private_key.as_str()
    }

    /// `GET {path}`.
    pub async fn get(&self, path: &str) -> Result<Option<Value>, GatewayError> {
        self.request(Method::GET, path, None).await
    }

    /// `POST {path}` with an optional one-root payload.
    pub async fn post(&self, path: &str, params: Option<&Attributes>) -> Result<Option<Value>, GatewayError> {
        self.request(Method::POST, path, params).await
    }

    /// `PUT {path}` with an optional one-root payload.
    pub async fn put(&self, path: &str, params: Option<&Attributes>) -> Result<Option<Value>, GatewayError> {
        self.request(Method::PUT, path, params).await
    }

    /// `DELETE {path}`.
    pub async fn delete(&self, path: &str) -> Result<Option<Value>, GatewayError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Attributes>,
    ) -> Result<Option<Value>, GatewayError> {
        let endpoint = format!("{method} {path}");
        let url = format!("{}{}", self.merchant_url, path);
        let body = params
            .map(xml::build_document)
            .transpose()
            .map_err(|e| GatewayError::InvalidArgument(e.to_string()))?;

        tracing::debug!(%endpoint, "sending gateway request");

        let resp = self
            .retry
            .run(&endpoint, |e: &reqwest::Error| may_resend(&method, e), || {
                let mut req = self
                    .http
                    .request(method.clone(), &url)
                    .basic_auth(&self.public_key, Some(self.private_key.as_str()));
                if let Some(body) = &body {
                    req = req.body(body.clone());
                }
                req.send()
            })
            .await
            .map_err(|e| GatewayError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status().as_u16();
        tracing::debug!(%endpoint, status, "gateway responded");
        match status {
            200 | 201 | 422 => {
                let text = resp.text().await.map_err(|e| GatewayError::Http {
                    endpoint: endpoint.clone(),
                    source: e,
                })?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                xml::parse(&text)
                    .map(Some)
                    .map_err(|e| GatewayError::Xml {
                        endpoint,
                        message: e.to_string(),
                    })
            }
            other => {
                tracing::warn!(%endpoint, status = other, "gateway returned error status");
                Err(GatewayError::from_status(other, None))
            }
        }
    }
}
