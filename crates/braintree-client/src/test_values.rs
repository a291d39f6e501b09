//! Sandbox values with known gateway behavior, for integration tests.

/// Transaction amounts whose outcome the sandbox fixes.
pub mod transaction_amounts {
    /// Authorizes successfully.
    pub const AUTHORIZE: &str = "1000.00";
    /// Declined by the processor.
    pub const DECLINE: &str = "2000.00";
}

/// Card numbers the sandbox accepts.
pub mod credit_card_numbers {
    pub const VISA: &str = "4111111111111111";
    pub const MASTER_CARD: &str = "5105105105105100";
    pub const AMEX: &str = "378282246310005";
}

/// Merchant account ids of the integration merchant.
pub mod merchant_accounts {
    pub const DEFAULT: &str = "sandbox_credit_card";
    pub const NON_DEFAULT: &str = "sandbox_credit_card_non_default";
}

/// Credentials the local development gateway is seeded with.
pub mod integration {
    pub const MERCHANT_ID: &str = "integration_merchant_id";
    pub const PUBLIC_KEY: &str = "integration_public_key";
    pub const PRIVATE_KEY: &str = "integration_private_key";
}
