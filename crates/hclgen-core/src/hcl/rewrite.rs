//! Line-level compatibility passes over the printed text
//!
//! Three passes run in order after pretty-printing:
//!
//! 1. blank-line policy: collapse doubled blank lines, then put exactly one
//!    blank line between adjacent top-level resource blocks
//! 2. singleton-block heuristic: `<key> = {` becomes `<key> {` unless the
//!    nesting-derived dotted path is a known map shape
//! 3. provider-block restructuring: a labeled `required_providers "<name>"`
//!    block becomes the map-of-maps shape newer grammar versions expect
//!
//! The passes are string surgery by design: they reproduce the legacy
//! output bytes that diff-based review workflows are anchored to. A missing
//! closing brace raises `RewriteError` instead of looping or silently
//! truncating.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::MapShapes;
use crate::error::HclgenError;
use crate::result::Result;

static SINGLETON_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\w+ = \{").expect("valid singleton pattern"));
static BLOCK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\}").expect("valid close pattern"));
static REQUIRED_PROVIDERS_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("required_providers \".*\" \\{").expect("valid providers pattern"));

/// Run all compatibility passes
pub fn rewrite(text: &str, map_shapes: &MapShapes) -> Result<String> {
    let text = apply_blank_line_policy(text);
    let text = rewrite_singleton_blocks(&text, map_shapes)?;
    restructure_required_providers(&text)
}

fn apply_blank_line_policy(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("\n\n") {
        out = out.replace("\n\n", "\n");
    }
    out.replace("}\nresource", "}\n\nresource")
}

/// Rewrite `<key> = {` to `<key> {` except for paths that originated as
/// true maps. A path-prefix stack of open `= {` lines is matched against
/// closing-brace lines to derive the dotted path.
fn rewrite_singleton_blocks(text: &str, map_shapes: &MapShapes) -> Result<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let total = lines.len();
    let mut prefix: Vec<String> = Vec::new();

    for line in lines.iter_mut() {
        if BLOCK_CLOSE.is_match(line) {
            if !prefix.is_empty() {
                prefix.pop();
            }
            continue;
        }
        if !SINGLETON_OPEN.is_match(line) {
            continue;
        }
        let key = line
            .split(" = {")
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        prefix.push(key);
        if map_shapes.contains(&prefix.join(".")) {
            continue;
        }
        *line = line.replacen(" = {", " {", 1);
    }

    if !prefix.is_empty() {
        return Err(HclgenError::rewrite_error(
            total,
            format!("unterminated block: {}", prefix.join(".")),
        ));
    }
    Ok(lines.join("\n"))
}

/// Rewrite `required_providers "<name>" { ... }` into
/// `required_providers { <name> = { ... } }`, re-indenting the captured
/// inner lines.
fn restructure_required_providers(text: &str) -> Result<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let Some(open) = lines
        .iter()
        .position(|line| REQUIRED_PROVIDERS_OPEN.is_match(line))
    else {
        return Ok(text.to_string());
    };

    let provider = lines[open]
        .trim()
        .split(' ')
        .nth(1)
        .unwrap_or("")
        .replace('"', "");
    let indent: String = lines[open]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    let mut close = open + 1;
    loop {
        if close >= lines.len() {
            return Err(HclgenError::rewrite_error(
                open + 1,
                "required_providers block never closed",
            ));
        }
        if BLOCK_CLOSE.is_match(&lines[close]) {
            break;
        }
        close += 1;
    }

    let inner: Vec<String> = lines[open + 1..close]
        .iter()
        .map(|line| format!("  {line}"))
        .collect();
    lines[open] = format!("{indent}required_providers {{");
    let replacement = format!(
        "{indent}  {provider} = {{\n{}\n{indent}  }}",
        inner.join("\n")
    );
    lines.splice(open + 1..close, std::iter::once(replacement));
    Ok(lines.join("\n"))
}
