//! Generic value-tree to parse-tree encoding
//!
//! Produces the same shape the legacy JSON round trip handed to the
//! sanitizer: every mapping entry becomes a single-key item with a quoted
//! key. The canonicalizer is what merges labels, fixes quoting and orders
//! siblings.

use indexmap::IndexMap;

use super::ast::{Body, Expr, Item, Key};
use crate::value::Value;

/// Encode a top-level document data map into a file body
pub fn encode_document(data: &IndexMap<String, Value>) -> Body {
    encode_map(data)
}

fn encode_map(map: &IndexMap<String, Value>) -> Body {
    Body::new(
        map.iter()
            .map(|(key, value)| Item::new(vec![Key::quoted(key)], encode_value(value)))
            .collect(),
    )
}

fn encode_value(value: &Value) -> Expr {
    match value {
        Value::String(s) => Expr::String(s.clone()),
        Value::Bool(b) => Expr::Bool(*b),
        Value::Int(i) => Expr::Int(*i),
        Value::Float(f) => Expr::Float(*f),
        Value::Seq(items) => Expr::List(items.iter().map(encode_value).collect()),
        Value::Map(map) => Expr::Object(encode_map(map)),
    }
}
