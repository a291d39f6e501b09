//! # Gateway XML Codec
//!
//! The gateway speaks a small XML dialect. Elements are dashed
//! (`first-name`), types ride on attributes, and lists are elements tagged
//! `type="array"`. This module converts between that dialect and
//! `serde_json::Value` trees with camelCase keys, which the typed value
//! objects then deserialize from.
//!
//! ## Decoding rules
//!
//! | Element | Value |
//! |---------|-------|
//! | `nil="true"` | `null` |
//! | `type="array"` | array of the children, names ignored |
//! | `type="integer"` | number |
//! | `type="boolean"` | bool |
//! | `type="datetime"` | RFC 3339 string |
//! | children | object keyed by camelCased child names |
//! | text or empty | string |
//!
//! Children of `custom-fields` keep the merchant's own key spelling, with
//! dashes turned into underscores instead of camelCase.

use std::fmt::Write as _;

use braintree_core::naming::{camel_case_to_delimiter, delimiter_to_camel_case, delimiter_to_underscore};
use braintree_core::Attributes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

/// Wire name of the element whose children are merchant-defined.
const CUSTOM_FIELDS: &str = "custom-fields";

/// XML declaration prefixed to every request body.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct XmlError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeType {
    Plain,
    Array,
    Integer,
    Boolean,
    Datetime,
}

#[derive(Debug)]
struct Frame {
    name: String,
    node_type: NodeType,
    nil: bool,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut node_type = NodeType::Plain;
        let mut nil = false;
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError(format!("attribute error in <{name}>: {e}")))?;
            let value = String::from_utf8_lossy(&attr.value);
            match attr.key.as_ref() {
                b"type" => {
                    node_type = match value.as_ref() {
                        "array" => NodeType::Array,
                        "integer" => NodeType::Integer,
                        "boolean" => NodeType::Boolean,
                        "datetime" => NodeType::Datetime,
                        _ => NodeType::Plain,
                    }
                }
                b"nil" => nil = value == "true",
                _ => {}
            }
        }
        Ok(Self {
            name,
            node_type,
            nil,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn close(self) -> Result<(String, Value), XmlError> {
        let value = if self.nil {
            Value::Null
        } else {
            match self.node_type {
                NodeType::Array => Value::Array(self.children.into_iter().map(|(_, v)| v).collect()),
                NodeType::Integer => {
                    let n: i64 = self.text.trim().parse().map_err(|_| {
                        XmlError(format!("<{}> is not an integer: {:?}", self.name, self.text))
                    })?;
                    Value::Number(Number::from(n))
                }
                NodeType::Boolean => Value::Bool(self.text.trim() == "true"),
                NodeType::Datetime => Value::String(self.text.trim().to_string()),
                NodeType::Plain if !self.children.is_empty() => {
                    let mut map = Map::new();
                    for (key, value) in self.children {
                        insert_child(&mut map, key, value);
                    }
                    Value::Object(map)
                }
                NodeType::Plain => Value::String(self.text),
            }
        };
        Ok((self.name, value))
    }
}

/// Repeated child names without `type="array"` collapse into a list.
fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

fn child_key(parent: &str, child: &str) -> String {
    if parent == CUSTOM_FIELDS {
        delimiter_to_underscore(child)
    } else {
        delimiter_to_camel_case(child)
    }
}

/// Attach a finished element to its parent, or return it as the document root.
fn attach(stack: &mut [Frame], name: String, value: Value) -> Option<Value> {
    match stack.last_mut() {
        Some(parent) => {
            let key = child_key(&parent.name, &name);
            parent.children.push((key, value));
            None
        }
        None => {
            let mut root = Map::new();
            root.insert(delimiter_to_camel_case(&name), value);
            Some(Value::Object(root))
        }
    }
}

/// Decode a gateway XML document into a one-entry object keyed by the
/// camelCased root element name.
///
/// # Errors
///
/// Returns [`XmlError`] for malformed XML, bad typed values, or a document
/// without a root element.
pub fn parse(body: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Frame::open(&start)?),
            Ok(Event::Empty(start)) => {
                let (name, value) = Frame::open(&start)?.close()?;
                if let Some(root) = attach(&mut stack, name, value) {
                    return Ok(root);
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| XmlError("closing tag without opening tag".into()))?;
                let (name, value) = frame.close()?;
                if let Some(root) = attach(&mut stack, name, value) {
                    return Ok(root);
                }
            }
            Ok(Event::Text(text)) => {
                let decoded = text
                    .unescape()
                    .map_err(|e| XmlError(format!("text decode error: {e}")))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&decoded);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError(format!("XML parse error: {e}"))),
        }
    }

    Err(XmlError("document has no root element".into()))
}

/// Encode `attributes` as a request document rooted at `root`.
///
/// `root` and attribute keys are given in camelCase and dasherized on the
/// way out; keys under `customFields` are written as given.
///
/// # Errors
///
/// Returns [`XmlError`] when a key would not make a well-formed element name.
pub fn build(root: &str, attributes: &Attributes) -> Result<String, XmlError> {
    let mut out = String::from(XML_DECLARATION);
    out.push('\n');
    let root_name = camel_case_to_delimiter(root, '-');
    write_map(&mut out, &root_name, attributes)?;
    Ok(out)
}

/// Encode a one-entry request payload such as `{"customer": {...}}` or
/// `{"id": "abc"}`. The entry's key becomes the root element.
///
/// # Errors
///
/// Returns [`XmlError`] unless `params` has exactly one entry, or when a key
/// would not make a well-formed element name.
pub fn build_document(params: &Attributes) -> Result<String, XmlError> {
    let mut entries = params.iter();
    let (root, value) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(XmlError(format!(
                "request payload must have exactly one root key, found {}",
                params.len()
            )))
        }
    };
    match value {
        Value::Object(map) => build(root, map),
        other => {
            let mut out = String::from(XML_DECLARATION);
            out.push('\n');
            write_value(&mut out, &camel_case_to_delimiter(root, '-'), other)?;
            Ok(out)
        }
    }
}

/// Whether `name` can be written as an element name without escaping.
/// Colons are refused so keys cannot introduce namespace prefixes.
pub fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn check_name(name: &str) -> Result<(), XmlError> {
    if is_element_name(name) {
        Ok(())
    } else {
        Err(XmlError(format!("{name:?} is not a valid element name")))
    }
}

fn write_map(out: &mut String, name: &str, map: &Attributes) -> Result<(), XmlError> {
    check_name(name)?;
    let _ = write!(out, "<{name}>");
    let raw_keys = name == CUSTOM_FIELDS;
    for (key, value) in map {
        let child = if raw_keys {
            key.clone()
        } else {
            camel_case_to_delimiter(key, '-')
        };
        write_value(out, &child, value)?;
    }
    let _ = write!(out, "</{name}>");
    Ok(())
}

fn write_value(out: &mut String, name: &str, value: &Value) -> Result<(), XmlError> {
    check_name(name)?;
    match value {
        Value::Null => {
            let _ = write!(out, r#"<{name} nil="true"/>"#);
        }
        Value::Bool(b) => {
            let _ = write!(out, r#"<{name} type="boolean">{b}</{name}>"#);
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            let _ = write!(out, r#"<{name} type="integer">{n}</{name}>"#);
        }
        Value::Number(n) => {
            let _ = write!(out, "<{name}>{n}</{name}>");
        }
        Value::String(s) => {
            let _ = write!(out, "<{name}>{}</{name}>", quick_xml::escape::escape(s.as_str()));
        }
        Value::Array(items) => {
            let _ = write!(out, r#"<{name} type="array">"#);
            for item in items {
                write_value(out, "item", item)?;
            }
            let _ = write!(out, "</{name}>");
        }
        Value::Object(map) => write_map(out, name, map)?,
    }
    Ok(())
}

/// Items stored under `container`, whatever shape the decoder produced.
///
/// A missing or empty container yields no items. A `type="array"` container
/// yields its elements. A plain container yields the `item` children, one
/// or many. A bare scalar yields itself.
pub fn extract_array(tree: &Value, container: &str, item: &str) -> Vec<Value> {
    match tree.get(container) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => match map.get(item) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single.clone()],
        },
        Some(scalar) => vec![scalar.clone()],
    }
}
