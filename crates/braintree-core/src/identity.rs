//! # Resource Identifiers
//!
//! Gateway resource ids travel inside URL paths, so they are checked before a
//! request is built. Customer, address and credit card ids allow
//! `[0-9A-Za-z_-]`; transaction ids are lowercase alphanumeric.

use crate::error::InvalidIdError;

/// The kind of resource an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// A vault customer.
    Customer,
    /// A customer address.
    Address,
    /// A vaulted credit card token.
    CreditCardToken,
    /// A transaction.
    Transaction,
}

impl IdKind {
    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Address => "address",
            Self::CreditCardToken => "credit card",
            Self::Transaction => "transaction",
        }
    }

    fn permits(self, c: char) -> bool {
        match self {
            Self::Transaction => c.is_ascii_lowercase() || c.is_ascii_digit(),
            _ => c.is_ascii_alphanumeric() || c == '_' || c == '-',
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validate an identifier of the given kind.
///
/// # Errors
///
/// [`InvalidIdError::Missing`] for an empty (or all-whitespace) id,
/// [`InvalidIdError::Malformed`] for disallowed characters.
pub fn validate_id(kind: IdKind, id: &str) -> Result<(), InvalidIdError> {
    if id.trim().is_empty() {
        return Err(InvalidIdError::Missing {
            kind: kind.label().to_string(),
        });
    }
    if !id.chars().all(|c| kind.permits(c)) {
        return Err(InvalidIdError::Malformed {
            kind: kind.label().to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}
