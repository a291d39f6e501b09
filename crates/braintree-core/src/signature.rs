//! # Request Signatures
//!
//! A [`Signature`] is the whitelist of attribute keys a gateway operation
//! accepts. [`verify_keys`] checks a caller's attribute tree against it before
//! anything is serialized or sent.
//!
//! ## Key paths
//!
//! Both the signature and the attributes are flattened into bracketed key
//! paths: a top-level `firstName` stays `firstName`, and `number` nested under
//! `creditCard` becomes `creditCard[number]`. A wildcard node flattens to
//! `parent[_anyKey_]`.
//!
//! ## Wildcards
//!
//! A wildcard covers exactly one level. `customFields[_anyKey_]` accepts
//! `customFields[color]` but not `customFields[color][shade]`. Matching is by
//! exact path prefix, so `customFields` never covers `myCustomFields[x]`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::InvalidKeysError;

/// Reserved path segment emitted for wildcard nodes.
pub const ANY_KEY: &str = "_anyKey_";

/// Caller-supplied attribute tree.
pub type Attributes = Map<String, Value>;

/// One entry of a request signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureNode {
    /// A permitted scalar key.
    Key(String),
    /// A permitted sub-object and the keys it may contain.
    Nested(String, Vec<SignatureNode>),
    /// Any key name is permitted at this level.
    AnyKey,
}

impl SignatureNode {
    /// The key this node declares, if it declares one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Key(name) | Self::Nested(name, _) => Some(name),
            Self::AnyKey => None,
        }
    }
}

/// The complete set of keys a gateway operation accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    nodes: Vec<SignatureNode>,
}

impl Signature {
    /// An empty signature. Accepts only empty attribute trees.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit nodes.
    pub fn from_nodes(nodes: Vec<SignatureNode>) -> Self {
        Self { nodes }
    }

    /// Add a scalar key.
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(SignatureNode::Key(name.into()));
        self
    }

    /// Add several scalar keys.
    pub fn keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes
            .extend(names.into_iter().map(|n| SignatureNode::Key(n.into())));
        self
    }

    /// Add a sub-object whose keys are described by `inner`.
    pub fn nested(mut self, name: impl Into<String>, inner: Signature) -> Self {
        self.nodes
            .push(SignatureNode::Nested(name.into(), inner.nodes));
        self
    }

    /// Permit any key at this level.
    pub fn any_key(mut self) -> Self {
        self.nodes.push(SignatureNode::AnyKey);
        self
    }

    /// Remove a top-level scalar key.
    pub fn without_key(mut self, name: &str) -> Self {
        self.nodes
            .retain(|n| !matches!(n, SignatureNode::Key(k) if k == name));
        self
    }

    /// Append `node` to the nested branch reached by `path`.
    ///
    /// Returns `false` and leaves the signature untouched when no nested
    /// branch exists at `path`.
    pub fn push_into(&mut self, path: &[&str], node: SignatureNode) -> bool {
        fn walk(nodes: &mut Vec<SignatureNode>, path: &[&str], node: SignatureNode) -> bool {
            let Some((head, rest)) = path.split_first() else {
                nodes.push(node);
                return true;
            };
            for candidate in nodes.iter_mut() {
                if let SignatureNode::Nested(name, children) = candidate {
                    if name == head {
                        return walk(children, rest, node);
                    }
                }
            }
            false
        }
        if path.is_empty() {
            return false;
        }
        walk(&mut self.nodes, path, node)
    }

    /// The nodes of this signature, in declaration order.
    pub fn nodes(&self) -> &[SignatureNode] {
        &self.nodes
    }

    /// Flattened key paths this signature permits.
    pub fn flatten(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        flatten_nodes(&self.nodes, None, &mut out);
        out
    }
}

fn qualify(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        None => key.to_string(),
        Some(ns) => format!("{ns}[{key}]"),
    }
}

fn flatten_nodes(nodes: &[SignatureNode], namespace: Option<&str>, out: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            SignatureNode::Key(name) => {
                out.insert(qualify(namespace, name));
            }
            SignatureNode::Nested(name, children) => {
                let scope = qualify(namespace, name);
                flatten_nodes(children, Some(&scope), out);
            }
            SignatureNode::AnyKey => {
                out.insert(qualify(namespace, ANY_KEY));
            }
        }
    }
}

/// Flatten a caller's attribute tree into bracketed key paths.
///
/// Objects recurse. Arrays recurse with their indices as keys. Every other
/// value, `null` included, is a leaf. An empty object contributes no paths.
pub fn flatten_attributes(attributes: &Attributes) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    flatten_map(attributes, None, &mut out);
    out
}

fn flatten_map(map: &Attributes, namespace: Option<&str>, out: &mut BTreeSet<String>) {
    for (key, value) in map {
        flatten_value(value, qualify(namespace, key), out);
    }
}

fn flatten_value(value: &Value, full_key: String, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(inner) => flatten_map(inner, Some(&full_key), out),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(item, format!("{full_key}[{index}]"), out);
            }
        }
        _ => {
            out.insert(full_key);
        }
    }
}

/// Namespace prefixes opened by wildcard entries, each ending in `[`.
///
/// A root-level wildcard yields the empty prefix.
fn wildcard_prefixes(valid: &BTreeSet<String>) -> Vec<String> {
    let marker = format!("[{ANY_KEY}]");
    valid
        .iter()
        .filter_map(|path| {
            if path == ANY_KEY {
                Some(String::new())
            } else {
                path.strip_suffix(&marker).map(|ns| format!("{ns}["))
            }
        })
        .collect()
}

/// Whether `path` names a key exactly one level inside a wildcard namespace.
fn covered_by_wildcard(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        if prefix.is_empty() {
            return !path.contains('[');
        }
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) => match rest.find(']') {
                Some(close) => close > 0 && close + 1 == rest.len(),
                None => false,
            },
            None => false,
        }
    })
}

/// Check that every key in `attributes` is permitted by `signature`.
///
/// Keys the signature declares but the attributes omit are fine; this is an
/// unknown-key check, not a required-key check.
///
/// # Errors
///
/// Returns [`InvalidKeysError`] listing every rejected path, sorted.
pub fn verify_keys(signature: &Signature, attributes: &Attributes) -> Result<(), InvalidKeysError> {
    let valid = signature.flatten();
    let prefixes = wildcard_prefixes(&valid);

    let invalid: Vec<String> = flatten_attributes(attributes)
        .into_iter()
        .filter(|path| !valid.contains(path))
        .filter(|path| !covered_by_wildcard(path, &prefixes))
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = invalid.len(), "attribute keys rejected by signature");
        Err(InvalidKeysError { keys: invalid })
    }
}
