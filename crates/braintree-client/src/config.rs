//! Gateway client configuration.
//!
//! Selects the gateway environment and carries the merchant credentials.
//! Load from environment variables with [`GatewayConfig::from_env`] or build
//! explicitly for tests.

use std::str::FromStr;

use url::Url;
use zeroize::Zeroizing;

use crate::retry::DEFAULT_MAX_RETRIES;
use crate::test_values::integration;

/// Default port of a locally running development gateway.
const DEFAULT_DEVELOPMENT_PORT: u16 = 3000;

/// Gateway environment. Determines the base URL every request is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Local gateway at `http://localhost:{GATEWAY_PORT}` (default port 3000).
    Development,
    /// Braintree QA gateway.
    Qa,
    /// Braintree sandbox gateway.
    Sandbox,
    /// Braintree production gateway.
    Production,
    /// Explicit base URL (mock servers, proxies).
    Custom(Url),
}

impl Environment {
    /// Base URL for this environment, without the merchant path.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = match self {
            Self::Development => {
                let port = std::env::var("GATEWAY_PORT")
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
                    .unwrap_or(DEFAULT_DEVELOPMENT_PORT);
                format!("http://localhost:{port}")
            }
            Self::Qa => "https://qa-master.braintreegateway.com".to_string(),
            Self::Sandbox => "https://sandbox.braintreegateway.com".to_string(),
            Self::Production => "https://www.braintreegateway.com".to_string(),
            Self::Custom(url) => return Ok(url.clone()),
        };
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(self.to_string(), e.to_string()))
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Qa => write!(f, "qa"),
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| ConfigError::InvalidUrl("BRAINTREE_ENVIRONMENT".into(), e.to_string()))?;
            return Ok(Self::Custom(url));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "qa" => Ok(Self::Qa),
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Credentials and environment for a gateway client.
///
/// Custom `Debug` implementation redacts the `private_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Which gateway to talk to.
    pub environment: Environment,
    /// Merchant id; forms the `/merchants/{merchant_id}` path prefix.
    pub merchant_id: String,
    /// Public key; the basic-auth username.
    pub public_key: String,
    /// Private key; the basic-auth password and the digest key.
    pub private_key: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a transport failure (no response at all).
    pub max_retries: u32,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GatewayConfig {
    /// Build a configuration with the default timeout.
    pub fn new(
        environment: Environment,
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            merchant_id: merchant_id.into(),
            public_key: public_key.into(),
            private_key: Zeroizing::new(private_key.into()),
            timeout_secs: 60,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `BRAINTREE_ENVIRONMENT` (default: `sandbox`; also accepts a URL)
    /// - `BRAINTREE_MERCHANT_ID` (required)
    /// - `BRAINTREE_PUBLIC_KEY` (required)
    /// - `BRAINTREE_PRIVATE_KEY` (required)
    /// - `BRAINTREE_TIMEOUT_SECS` (default: 60)
    /// - `BRAINTREE_MAX_RETRIES` (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var("BRAINTREE_ENVIRONMENT") {
            Ok(raw) => raw.parse()?,
            Err(_) => Environment::Sandbox,
        };

        Ok(Self {
            environment,
            merchant_id: required_var("BRAINTREE_MERCHANT_ID")?,
            public_key: required_var("BRAINTREE_PUBLIC_KEY")?,
            private_key: Zeroizing::new(required_var("BRAINTREE_PRIVATE_KEY")?),
            timeout_secs: std::env::var("BRAINTREE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            max_retries: std::env::var("BRAINTREE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }

    /// Create a configuration pointing at a mock gateway (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base_url` cannot be parsed.
    pub fn local_mock(base_url: &str, merchant_id: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?;
        Ok(Self {
            environment: Environment::Custom(url),
            merchant_id: merchant_id.to_string(),
            public_key: integration::PUBLIC_KEY.to_string(),
            private_key: Zeroizing::new(integration::PRIVATE_KEY.to_string()),
            timeout_secs: 5,
            max_retries: 0,
        })
    }

    /// Base URL of the configured environment.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        self.environment.base_url()
    }

    /// `/merchants/{merchant_id}`.
    pub fn merchant_path(&self) -> String {
        format!("/merchants/{}", self.merchant_id)
    }

    /// Base URL plus merchant path, without a trailing slash.
    pub fn merchant_url(&self) -> Result<String, ConfigError> {
        let base = self.base_url()?;
        Ok(format!(
            "{}{}",
            base.as_str().trim_end_matches('/'),
            self.merchant_path()
        ))
    }
}

fn required_var(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("unknown gateway environment: {0}")]
    UnknownEnvironment(String),
}
