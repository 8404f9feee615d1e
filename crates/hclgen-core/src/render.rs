//! Public rendering surface
//!
//! `render` is the downstream contract: identical inputs always produce
//! byte-identical output, and no partial bytes are ever returned alongside
//! an error. The `hcl` format runs the full pipeline; `json` bypasses
//! canonicalization and the compatibility rewriter entirely.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::document::Document;
use crate::error::HclgenError;
use crate::hcl;
use crate::resource::Resource;
use crate::result::Result;
use crate::value::Value;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Canonical pretty-printed grammar (full pipeline)
    #[default]
    Hcl,
    /// Plain structured data, sorted keys, two-space indentation
    Json,
}

impl FromStr for OutputFormat {
    type Err = HclgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hcl" => Ok(OutputFormat::Hcl),
            "json" => Ok(OutputFormat::Json),
            other => Err(HclgenError::format_error(other)),
        }
    }
}

/// Rendering options, deserializable from configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Output format name, `hcl` or `json`
    pub format: String,
    /// Whether siblings are canonically sorted
    pub sort: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: "hcl".to_string(),
            sort: true,
        }
    }
}

/// Render an assembled document to bytes
pub fn render(document: &Document, format: &str, sort: bool) -> Result<Vec<u8>> {
    match OutputFormat::from_str(format)? {
        OutputFormat::Json => json_print(document),
        OutputFormat::Hcl => hcl_print(document, sort),
    }
}

/// Render with options from configuration
pub fn render_with(document: &Document, options: &RenderOptions) -> Result<Vec<u8>> {
    render(document, &options.format, options.sort)
}

/// Assemble decoded resources plus provider data and render in one step
pub fn render_resources(
    resources: &[Resource],
    provider_data: IndexMap<String, Value>,
    format: &str,
    sort: bool,
) -> Result<Vec<u8>> {
    let document = Document::from_resources(resources, provider_data);
    render(&document, format, sort)
}

fn json_print(document: &Document) -> Result<Vec<u8>> {
    let data = Value::Map(document.data().clone());
    serde_json::to_vec_pretty(&data)
        .map_err(|err| HclgenError::internal_error(format!("json serialization failed: {err}")))
}

fn hcl_print(document: &Document, sort: bool) -> Result<Vec<u8>> {
    let mut body = hcl::encode_document(document.data());
    hcl::canonicalize(&mut body, sort, document.hints())?;
    let text = hcl::print_file(&body);
    let text = hcl::rewrite(&text, document.map_shapes())?;
    Ok(text.into_bytes())
}
