//! Captured cloud resources
//!
//! A [`Resource`] is the per-resource input handed over by the provider
//! layer: the raw flat attribute bag, the type schema reference point, and
//! the per-resource knobs (key filters, ordering hints, extra fields).
//! `decode_state` turns the bag into the pruned value tree the document
//! assembler consumes.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::HclgenError;
use crate::flatmap::FlatmapParser;
use crate::prune::prune;
use crate::result::Result;
use crate::schema::BlockSchema;
use crate::value::Value;

const SAFE_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// One captured cloud resource and its decode configuration
#[derive(Debug, Clone)]
pub struct Resource {
    /// Provider-side identifier
    pub id: String,
    /// Sanitized display name, usable as an HCL block label
    pub resource_name: String,
    /// Resource type tag, e.g. `aws_instance`
    pub resource_type: String,
    /// Owning provider tag, e.g. `aws`
    pub provider: String,
    /// Flat attribute bag from captured state
    pub attributes: BTreeMap<String, String>,
    /// Regex patterns stripped from the bag before decoding
    pub ignore_keys: Vec<String>,
    /// Regex patterns whose paths are exempt from zero-value pruning
    pub allow_empty_values: Vec<String>,
    /// Extra fields merged into the decoded tree before pruning
    pub additional_fields: IndexMap<String, Value>,
    /// Dotted logical paths whose list order must survive canonical sorting
    pub preserve_order: Vec<String>,
    /// Decoded and pruned value tree, set by `decode_state`
    pub item: Option<Value>,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        resource_name: &str,
        resource_type: impl Into<String>,
        provider: impl Into<String>,
        attributes: BTreeMap<String, String>,
        allow_empty_values: Vec<String>,
        additional_fields: IndexMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_name: sanitize_name(resource_name),
            resource_type: resource_type.into(),
            provider: provider.into(),
            attributes,
            ignore_keys: Vec::new(),
            allow_empty_values,
            additional_fields,
            preserve_order: Vec::new(),
            item: None,
        }
    }

    pub fn new_simple(
        id: impl Into<String>,
        resource_name: &str,
        resource_type: impl Into<String>,
        provider: impl Into<String>,
        allow_empty_values: Vec<String>,
    ) -> Self {
        Self::new(
            id,
            resource_name,
            resource_type,
            provider,
            BTreeMap::new(),
            allow_empty_values,
            IndexMap::new(),
        )
    }

    /// Resource type with the provider prefix removed
    pub fn service_name(&self) -> &str {
        let prefix = format!("{}_", self.provider);
        self.resource_type
            .strip_prefix(prefix.as_str())
            .unwrap_or(&self.resource_type)
    }

    /// Attribute used to reference this resource from output blocks
    pub fn id_key(&self) -> &'static str {
        if self.attributes.contains_key("self_link") {
            "self_link"
        } else {
            "id"
        }
    }

    /// `<type>.<name>` address for diagnostics
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.resource_name)
    }

    /// Decode the attribute bag against `schema`, merge additional fields,
    /// and prune. Failures are `DecodeError`s scoped to this resource.
    pub fn decode_state(&mut self, schema: &BlockSchema) -> Result<()> {
        let ignore = compile_patterns(&self.ignore_keys)?;
        let allow = compile_patterns(
            &self
                .allow_empty_values
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect::<Vec<_>>(),
        )?;

        let parser = FlatmapParser::new(&self.attributes, &ignore);
        let mut tree = parser.parse(schema)?;

        if let Some(map) = tree.as_map_mut() {
            for (key, value) in &self.additional_fields {
                map.insert(key.clone(), value.clone());
            }
        }

        prune(&mut tree, schema, &allow);
        self.item = Some(tree);
        Ok(())
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|err| {
                HclgenError::decode_error(pattern, format!("invalid key pattern: {err}"))
            })
        })
        .collect()
}

/// Sanitize a display name into a valid HCL block label.
///
/// Every character outside `[0-9A-Za-z_-]` becomes `-XXXX-` (uppercase hex
/// of its UTF-8 bytes, zero-padded to at least four digits), and the result
/// is prefixed with `tfer--` so generated labels never collide with
/// hand-written ones.
pub fn sanitize_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if SAFE_CHARS.contains(c) {
            escaped.push(c);
        } else {
            let mut buf = [0u8; 4];
            let bytes = c.encode_utf8(&mut buf).as_bytes();
            let mut hex = String::with_capacity(bytes.len() * 2);
            for b in bytes {
                hex.push_str(&format!("{b:02X}"));
            }
            escaped.push('-');
            for _ in hex.len()..4 {
                escaped.push('0');
            }
            escaped.push_str(&hex);
            escaped.push('-');
        }
    }
    format!("tfer--{escaped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, TypeKind};

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("web-server"), "tfer--web-server");
        assert_eq!(sanitize_name("my.bucket"), "tfer--my-002E-bucket");
        assert_eq!(sanitize_name("a/b"), "tfer--a-002F-b");
    }

    #[test]
    fn test_id_key_prefers_self_link() {
        let mut resource = Resource::new_simple("i-1", "web", "google_compute_instance", "google", vec![]);
        assert_eq!(resource.id_key(), "id");
        resource
            .attributes
            .insert("self_link".to_string(), "https://...".to_string());
        assert_eq!(resource.id_key(), "self_link");
    }

    #[test]
    fn test_service_name_strips_provider_prefix() {
        let resource = Resource::new_simple("i-1", "web", "aws_instance", "aws", vec![]);
        assert_eq!(resource.service_name(), "instance");
    }

    #[test]
    fn test_decode_state_merges_additional_fields_and_prunes() {
        let schema = BlockSchema::new()
            .with_attribute("ami", AttributeSchema::new(TypeKind::String))
            .with_attribute("description", AttributeSchema::new(TypeKind::String).optional());
        let mut resource = Resource::new_simple("i-1", "web", "aws_instance", "aws", vec![]);
        resource.attributes.insert("ami".to_string(), "ami-123".to_string());
        resource.attributes.insert("description".to_string(), String::new());
        resource
            .additional_fields
            .insert("custom".to_string(), Value::from("extra"));

        resource.decode_state(&schema).unwrap();
        let item = resource.item.as_ref().unwrap().as_map().unwrap();
        assert_eq!(item["ami"], Value::from("ami-123"));
        assert_eq!(item["custom"], Value::from("extra"));
        assert!(!item.contains_key("description"));
    }

    #[test]
    fn test_invalid_ignore_pattern_is_decode_error() {
        let schema = BlockSchema::new();
        let mut resource = Resource::new_simple("i-1", "web", "aws_instance", "aws", vec![]);
        resource.ignore_keys.push("([unclosed".to_string());
        assert!(resource.decode_state(&schema).is_err());
    }
}
