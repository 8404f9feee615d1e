//! Canonicalization of the encoded parse tree
//!
//! Walks the generically encoded tree and rewrites it into the one
//! deterministic form the printer emits:
//!
//! - nested single-key objects whose children are all objects merge into
//!   multi-label blocks (`resource "type" "name" { ... }`), and lists whose
//!   elements are all objects expand into repeated blocks
//! - quoted keys that only contain safe characters are unquoted; keys
//!   starting with `--` stay quoted
//! - string scalars that carry a heredoc marker are restored to multi-line
//!   tokens, with embedded JSON payloads re-indented
//! - siblings sort by their own rendered text, except where an ordering
//!   hint protects a subtree for this exact resource instance
//!
//! The walk carries a path stack of traversed labels; hint lookups anchor
//! on the fixed `resource/<type>/<name>` prefix and ignore numeric list
//! indices.

use super::ast::{Body, Expr, Item};
use super::printer::{render_expr_standalone, render_item_standalone};
use crate::document::OrderingHints;
use crate::error::HclgenError;
use crate::result::Result;

/// Canonicalize `body` in place. `sort = false` keeps merging, key fixes
/// and heredoc restoration but leaves sibling order untouched.
pub fn canonicalize(body: &mut Body, sort: bool, hints: &OrderingHints) -> Result<()> {
    flatten_body(body);
    let mut canonicalizer = Canonicalizer {
        sort,
        hints,
        path: Vec::new(),
    };
    canonicalizer.visit_body(body)
}

/// Merge nested single-key objects into multi-label blocks and expand
/// lists of objects into repeated blocks, recursively.
fn flatten_body(body: &mut Body) {
    let items = std::mem::take(&mut body.items);
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        expand_item(item, &mut out);
    }
    body.items = out;

    for item in &mut body.items {
        match &mut item.value {
            Expr::Object(inner) => flatten_body(inner),
            Expr::List(elements) => {
                for element in elements {
                    if let Expr::Object(inner) = element {
                        flatten_body(inner);
                    }
                }
            }
            _ => {}
        }
    }
}

fn expand_item(item: Item, out: &mut Vec<Item>) {
    match item.value {
        Expr::Object(body)
            if !body.items.is_empty() && body.items.iter().all(|child| child.value.is_object()) =>
        {
            for child in body.items {
                let mut keys = item.keys.clone();
                keys.extend(child.keys);
                expand_item(Item::new(keys, child.value), out);
            }
        }
        Expr::List(elements)
            if !elements.is_empty() && elements.iter().all(Expr::is_object) =>
        {
            for element in elements {
                expand_item(Item::new(item.keys.clone(), element), out);
            }
        }
        value => out.push(Item::new(item.keys, value)),
    }
}

struct Canonicalizer<'a> {
    sort: bool,
    hints: &'a OrderingHints,
    path: Vec<String>,
}

impl Canonicalizer<'_> {
    fn visit_body(&mut self, body: &mut Body) -> Result<()> {
        // children first: ordering decisions compare fully processed text
        for item in &mut body.items {
            self.visit_item(item)?;
        }

        if !self.sort {
            return Ok(());
        }

        if let Some(key) = self.hinted_child_key() {
            let mut ordered = Vec::new();
            let mut rest = Vec::new();
            for item in body.items.drain(..) {
                if item.first_key() == key {
                    ordered.push(item);
                } else {
                    rest.push(item);
                }
            }
            rest.sort_by_cached_key(render_item_standalone);
            ordered.extend(rest);
            body.items = ordered;
        } else {
            body.items.sort_by_cached_key(render_item_standalone);
        }
        Ok(())
    }

    fn visit_item(&mut self, item: &mut Item) -> Result<()> {
        normalize_first_key(item);
        let pushed = item.keys.len();
        for key in &item.keys {
            self.path.push(key.text.clone());
        }
        let result = self.visit_expr(&mut item.value);
        self.path.truncate(self.path.len() - pushed);
        result
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        if let Expr::String(s) = expr {
            if s.starts_with("<<") {
                if let Some(text) = restore_heredoc(s) {
                    *expr = Expr::Heredoc(text);
                }
                return Ok(());
            }
        }

        match expr {
            Expr::Object(body) => self.visit_body(body),
            Expr::List(elements) => {
                for (index, element) in elements.iter_mut().enumerate() {
                    self.path.push(index.to_string());
                    self.visit_expr(element)?;
                    self.path.pop();
                }
                if self.sort && !self.is_path_ordered(&self.logical_path()) {
                    elements.sort_by_cached_key(render_expr_standalone);
                }
                Ok(())
            }
            Expr::Float(f) if !f.is_finite() => Err(HclgenError::canonicalize_error(
                "number has no literal form",
                f.to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Dotted path below the `resource/<type>/<name>` anchor, numeric list
    /// indices dropped
    fn logical_path(&self) -> String {
        self.path
            .iter()
            .skip(3)
            .filter(|part| part.parse::<usize>().is_err())
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }

    /// If a hint names a direct child list of the current container, the
    /// key whose items keep their original order
    fn hinted_child_key(&self) -> Option<String> {
        let logical = self.logical_path();
        if logical.is_empty() {
            return None;
        }
        for hint in self.instance_hints()? {
            if let Some(remainder) = hint.strip_prefix(logical.as_str()) {
                if let Some(key) = remainder.strip_prefix('.') {
                    if !key.is_empty() && !key.contains('.') {
                        return Some(key.to_string());
                    }
                }
            }
        }
        None
    }

    fn is_path_ordered(&self, logical: &str) -> bool {
        self.instance_hints()
            .is_some_and(|hints| hints.iter().any(|hint| hint == logical))
    }

    fn instance_hints(&self) -> Option<&Vec<String>> {
        if self.path.len() < 3 || self.path[0] != "resource" {
            return None;
        }
        self.hints.get(&self.path[1])?.get(&self.path[2])
    }
}

fn normalize_first_key(item: &mut Item) {
    if let Some(key) = item.keys.first_mut() {
        if key.quoted
            && !key.text.is_empty()
            && !key.text.starts_with("--")
            && key.text.chars().all(is_safe_key_char)
        {
            key.quoted = false;
        }
    }
}

fn is_safe_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Undo the escaping artifacts around a heredoc-marked string and, when the
/// inner lines parse as a JSON object or array, re-serialize them with
/// two-space indentation between the preserved marker lines.
///
/// Returns None for a marker with no terminator line; the value then stays
/// an ordinary quoted string.
fn restore_heredoc(raw: &str) -> Option<String> {
    let text = raw.replace("\\n", "\n").replace("\\t", "");
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return None;
    }

    let opening = lines[0];
    let closing = lines[lines.len() - 1];
    let body = lines[1..lines.len() - 1].join("\n").replace("\\\"", "\"");

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) if value.is_object() || value.is_array() => {
            match serde_json::to_string_pretty(&value) {
                Ok(pretty) => Some(format!("{opening}\n{pretty}\n{closing}")),
                Err(_) => Some(text),
            }
        }
        _ => Some(text),
    }
}
