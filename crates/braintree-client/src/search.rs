//! # Search Criteria
//!
//! Advanced search requests are built from nodes, one per searchable field.
//! Each node renders its terms with [`SearchNode::to_param`] and a
//! [`TransactionSearch`] gathers them into the `search` payload.
//!
//! ```
//! use braintree_client::search::TransactionSearch;
//!
//! let search = TransactionSearch::new()
//!     .with(TransactionSearch::amount().between("10.00", "20.00"))
//!     .with(TransactionSearch::customer_email().ends_with("@example.com"));
//! assert_eq!(search.criteria()["amount"]["min"], "10.00");
//! ```

use braintree_core::Attributes;
use serde_json::{Map, Value};

/// A searchable field and the terms set on it.
pub trait SearchNode {
    /// Criteria key, camelCase.
    fn name(&self) -> &str;
    /// The terms as sent in the request.
    fn to_param(&self) -> Value;
}

/// Inclusive bounds on a numeric or date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeValueNode {
    name: String,
    min: Option<String>,
    max: Option<String>,
}

impl RangeValueNode {
    /// An unbounded range on `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: None,
            max: None,
        }
    }

    /// Lower bound.
    pub fn greater_than_or_equal_to(mut self, value: impl Into<String>) -> Self {
        self.min = Some(value.into());
        self
    }

    /// Upper bound.
    pub fn less_than_or_equal_to(mut self, value: impl Into<String>) -> Self {
        self.max = Some(value.into());
        self
    }

    /// Both bounds.
    pub fn between(self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.greater_than_or_equal_to(min).less_than_or_equal_to(max)
    }
}

impl SearchNode for RangeValueNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_param(&self) -> Value {
        let mut terms = Map::new();
        if let Some(min) = &self.min {
            terms.insert("min".into(), Value::String(min.clone()));
        }
        if let Some(max) = &self.max {
            terms.insert("max".into(), Value::String(max.clone()));
        }
        Value::Object(terms)
    }
}

/// Membership in a set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleValueNode {
    name: String,
    items: Vec<String>,
}

impl MultipleValueNode {
    /// An empty set on `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Match any of `items`.
    pub fn in_list<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Match exactly `value`.
    pub fn is(self, value: impl Into<String>) -> Self {
        self.in_list([value.into()])
    }
}

impl SearchNode for MultipleValueNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_param(&self) -> Value {
        Value::Array(self.items.iter().cloned().map(Value::String).collect())
    }
}

/// Text comparison on a string field. The last operator set wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    name: String,
    term: Option<(&'static str, String)>,
}

impl TextNode {
    /// A text node on `name` with no comparison set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            term: None,
        }
    }

    fn set(mut self, operator: &'static str, value: impl Into<String>) -> Self {
        self.term = Some((operator, value.into()));
        self
    }

    /// Equal to `value`.
    pub fn is(self, value: impl Into<String>) -> Self {
        self.set("is", value)
    }

    /// Not equal to `value`.
    pub fn is_not(self, value: impl Into<String>) -> Self {
        self.set("isNot", value)
    }

    /// Starts with `value`.
    pub fn starts_with(self, value: impl Into<String>) -> Self {
        self.set("startsWith", value)
    }

    /// Ends with `value`.
    pub fn ends_with(self, value: impl Into<String>) -> Self {
        self.set("endsWith", value)
    }

    /// Contains `value`.
    pub fn contains(self, value: impl Into<String>) -> Self {
        self.set("contains", value)
    }
}

impl SearchNode for TextNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_param(&self) -> Value {
        let mut terms = Map::new();
        if let Some((operator, value)) = &self.term {
            terms.insert((*operator).to_string(), Value::String(value.clone()));
        }
        Value::Object(terms)
    }
}

/// Criteria for a transaction search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSearch {
    criteria: Attributes,
}

impl TransactionSearch {
    /// No criteria; matches every transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any earlier node on the same field.
    pub fn with(mut self, node: impl SearchNode) -> Self {
        self.criteria.insert(node.name().to_string(), node.to_param());
        self
    }

    /// The request payload.
    pub fn criteria(&self) -> &Attributes {
        &self.criteria
    }

    /// Whether no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn amount() -> RangeValueNode {
        RangeValueNode::new("amount")
    }

    pub fn created_at() -> RangeValueNode {
        RangeValueNode::new("createdAt")
    }

    pub fn id() -> TextNode {
        TextNode::new("id")
    }

    pub fn order_id() -> TextNode {
        TextNode::new("orderId")
    }

    pub fn customer_id() -> TextNode {
        TextNode::new("customerId")
    }

    pub fn customer_email() -> TextNode {
        TextNode::new("customerEmail")
    }

    pub fn customer_first_name() -> TextNode {
        TextNode::new("customerFirstName")
    }

    pub fn customer_last_name() -> TextNode {
        TextNode::new("customerLastName")
    }

    pub fn credit_card_cardholder_name() -> TextNode {
        TextNode::new("creditCardCardholderName")
    }

    pub fn payment_method_token() -> TextNode {
        TextNode::new("paymentMethodToken")
    }

    pub fn ids() -> MultipleValueNode {
        MultipleValueNode::new("ids")
    }

    pub fn status() -> MultipleValueNode {
        MultipleValueNode::new("status")
    }

    pub fn transaction_type() -> MultipleValueNode {
        MultipleValueNode::new("type")
    }

    pub fn merchant_account_id() -> MultipleValueNode {
        MultipleValueNode::new("merchantAccountId")
    }
}
