//! Parse tree for the emitted grammar
//!
//! A transient, explicit tagged union that exists only to drive
//! canonicalization and printing, then is discarded. It replaces the
//! dynamically typed AST the legacy pipeline round-tripped through a JSON
//! parser, so unrepresentable shapes are compile errors instead of runtime
//! type assertions.

/// A block body or the file itself: an ordered list of items
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub items: Vec<Item>,
}

impl Body {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

/// One `key = value` attribute or labeled block.
///
/// Multi-label blocks (`resource "type" "name" { ... }`) carry one key per
/// label; the generic encoder only ever produces single-key items, and the
/// canonicalizer merges nested single-key objects into multi-key blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub keys: Vec<Key>,
    pub value: Expr,
}

impl Item {
    pub fn new(keys: Vec<Key>, value: Expr) -> Self {
        Self { keys, value }
    }

    /// Unquoted text of the first key, used for hint partitioning
    pub fn first_key(&self) -> &str {
        self.keys.first().map(|k| k.text.as_str()).unwrap_or("")
    }
}

/// An item key, tracking whether it renders quoted
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub text: String,
    pub quoted: bool,
}

impl Key {
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }
}

/// An attribute value expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A restored multi-line literal: the full token text, marker line
    /// through closing marker line, printed verbatim
    Heredoc(String),
    List(Vec<Expr>),
    Object(Body),
}

impl Expr {
    pub fn is_object(&self) -> bool {
        matches!(self, Expr::Object(_))
    }
}
