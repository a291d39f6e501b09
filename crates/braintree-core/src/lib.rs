#![deny(missing_docs)]

//! # braintree-core — Foundations for the Braintree Gateway Client
//!
//! Everything in this crate runs before a request leaves the process and
//! performs no I/O.
//!
//! - [`signature`]: request signatures and the unknown-key check
//!   ([`verify_keys`]) every mutating gateway call runs first.
//! - [`naming`]: conversions between the gateway's dashed wire names and the
//!   camelCase keys of attribute trees.
//! - [`digest`]: HMAC-SHA1 digests for transparent redirect data.
//! - [`identity`]: rules for ids that are interpolated into URL paths.
//! - [`error`]: the [`CoreError`] hierarchy.

pub mod digest;
pub mod error;
pub mod identity;
pub mod naming;
pub mod signature;

pub use digest::{hex_digest, verify_hex_digest};
pub use error::{CoreError, DigestError, InvalidIdError, InvalidKeysError};
pub use identity::{validate_id, IdKind};
pub use signature::{flatten_attributes, verify_keys, Attributes, Signature, SignatureNode, ANY_KEY};
