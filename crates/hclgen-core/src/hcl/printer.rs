//! Pretty printer for the parse tree
//!
//! Emits two-space indentation, aligns `=` across runs of consecutive
//! single-line attributes, prints multi-key items as labeled block headers
//! and single-key object items as `key = {` (the compatibility rewriter
//! decides afterwards which of those are blocks and which stay maps).
//! Heredoc tokens are written verbatim so their closing marker stays at the
//! start of a line.

use super::ast::{Body, Expr, Item};

const INDENT: &str = "  ";

/// Print a whole file body
pub fn print_file(body: &Body) -> String {
    let mut out = String::new();
    print_body(&mut out, body, 0);
    out
}

/// Render one item standalone, without alignment context. This is the
/// content-derived text canonical sorting compares.
pub(crate) fn render_item_standalone(item: &Item) -> String {
    let mut out = String::new();
    match inline_value(&item.value) {
        Some(value) => {
            out.push_str(&header_text(item));
            out.push_str(" = ");
            out.push_str(&value);
            out.push('\n');
        }
        None => print_block_item(&mut out, item, 0),
    }
    out
}

/// Render one expression standalone, for sorting list elements
pub(crate) fn render_expr_standalone(expr: &Expr) -> String {
    match inline_value(expr) {
        Some(value) => value,
        None => {
            let mut out = String::new();
            print_list_element(&mut out, expr, 0);
            out
        }
    }
}

fn print_body(out: &mut String, body: &Body, depth: usize) {
    let rendered: Vec<Option<String>> = body.items.iter().map(|item| inline_value(&item.value)).collect();

    let mut i = 0;
    while i < body.items.len() {
        if rendered[i].is_none() {
            print_block_item(out, &body.items[i], depth);
            i += 1;
            continue;
        }

        // run of single-line attributes: align the assignments
        let mut j = i;
        while j < body.items.len() && rendered[j].is_some() {
            j += 1;
        }
        let width = body.items[i..j]
            .iter()
            .map(|item| header_text(item).len())
            .max()
            .unwrap_or(0);
        for k in i..j {
            if let Some(value) = &rendered[k] {
                let header = header_text(&body.items[k]);
                push_indent(out, depth);
                out.push_str(&header);
                for _ in header.len()..width {
                    out.push(' ');
                }
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
        }
        i = j;
    }
}

fn print_block_item(out: &mut String, item: &Item, depth: usize) {
    let header = header_text(item);
    match &item.value {
        Expr::Object(body) => {
            push_indent(out, depth);
            out.push_str(&header);
            if item.keys.len() > 1 {
                out.push_str(" {\n");
            } else {
                out.push_str(" = {\n");
            }
            print_body(out, body, depth + 1);
            push_indent(out, depth);
            out.push_str("}\n");
        }
        Expr::Heredoc(text) => {
            push_indent(out, depth);
            out.push_str(&header);
            out.push_str(" = ");
            out.push_str(text);
            out.push('\n');
        }
        Expr::List(elements) => {
            push_indent(out, depth);
            out.push_str(&header);
            out.push_str(" = [\n");
            for element in elements {
                print_list_element(out, element, depth + 1);
            }
            push_indent(out, depth);
            out.push_str("]\n");
        }
        scalar => {
            push_indent(out, depth);
            out.push_str(&header);
            out.push_str(" = ");
            out.push_str(&render_scalar(scalar));
            out.push('\n');
        }
    }
}

fn print_list_element(out: &mut String, expr: &Expr, depth: usize) {
    match expr {
        Expr::Object(body) => {
            push_indent(out, depth);
            out.push_str("{\n");
            print_body(out, body, depth + 1);
            push_indent(out, depth);
            out.push_str("},\n");
        }
        Expr::Heredoc(text) => {
            push_indent(out, depth);
            out.push_str(text);
            out.push_str(",\n");
        }
        other => {
            push_indent(out, depth);
            match inline_value(other) {
                Some(value) => out.push_str(&value),
                None => {
                    // nested multi-line list
                    out.push_str("[\n");
                    if let Expr::List(elements) = other {
                        for element in elements {
                            print_list_element(out, element, depth + 1);
                        }
                    }
                    push_indent(out, depth);
                    out.push(']');
                }
            }
            out.push_str(",\n");
        }
    }
}

/// Single-line rendering of an expression, or None when it must span lines
fn inline_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::String(_) | Expr::Bool(_) | Expr::Int(_) | Expr::Float(_) => {
            Some(render_scalar(expr))
        }
        Expr::Heredoc(_) | Expr::Object(_) => None,
        Expr::List(elements) => {
            let mut parts = Vec::with_capacity(elements.len());
            for element in elements {
                parts.push(inline_value(element)?);
            }
            Some(format!("[{}]", parts.join(", ")))
        }
    }
}

fn render_scalar(expr: &Expr) -> String {
    match expr {
        Expr::String(s) => quote_string(s),
        Expr::Bool(b) => b.to_string(),
        Expr::Int(i) => i.to_string(),
        Expr::Float(f) => f.to_string(),
        _ => String::new(),
    }
}

fn header_text(item: &Item) -> String {
    let mut parts = Vec::with_capacity(item.keys.len());
    for key in &item.keys {
        if key.quoted {
            parts.push(format!("\"{}\"", key.text));
        } else {
            parts.push(key.text.clone());
        }
    }
    parts.join(" ")
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
