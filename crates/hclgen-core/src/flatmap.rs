//! Flatmap attribute decoding
//!
//! Captured resource state arrives as a flat string bag whose dotted keys
//! encode nesting: `tags.%` / `list.#` are count markers for maps and
//! lists, and child keys carry the map key or list index as a segment
//! (`tags.env`, `list.0.name`). The parser rebuilds a typed [`Value`] tree
//! by walking the resource's [`BlockSchema`].
//!
//! The parse is a pure function of the bag and schema. An absent optional
//! scalar produces no node at all, which is distinct from an explicit empty
//! string that was present in the bag.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use regex::Regex;

use crate::error::HclgenError;
use crate::result::Result;
use crate::schema::{BlockSchema, TypeKind};
use crate::value::Value;

/// Decoder from a flat attribute bag to a typed value tree
pub struct FlatmapParser<'a> {
    attributes: &'a BTreeMap<String, String>,
    ignore_keys: &'a [Regex],
}

impl<'a> FlatmapParser<'a> {
    pub fn new(attributes: &'a BTreeMap<String, String>, ignore_keys: &'a [Regex]) -> Self {
        Self {
            attributes,
            ignore_keys,
        }
    }

    /// Decode the whole bag against the resource's root schema
    pub fn parse(&self, schema: &BlockSchema) -> Result<Value> {
        self.parse_block("", schema)
    }

    fn ignored(&self, key: &str) -> bool {
        self.ignore_keys.iter().any(|re| re.is_match(key))
    }

    fn get(&self, key: &str) -> Option<&str> {
        if self.ignored(key) {
            return None;
        }
        self.attributes.get(key).map(String::as_str)
    }

    fn parse_block(&self, prefix: &str, schema: &BlockSchema) -> Result<Value> {
        let mut out = IndexMap::new();
        for (name, attr) in &schema.attributes {
            let path = child_path(prefix, name);
            if let Some(value) = self.parse_attribute(&path, &attr.kind)? {
                out.insert(name.clone(), value);
            }
        }
        for (name, nested) in &schema.block_types {
            let path = child_path(prefix, name);
            if let Some(value) = self.parse_block_list(&path, &nested.block)? {
                out.insert(name.clone(), value);
            }
        }
        Ok(Value::Map(out))
    }

    fn parse_attribute(&self, path: &str, kind: &TypeKind) -> Result<Option<Value>> {
        match kind {
            TypeKind::String | TypeKind::Bool | TypeKind::Int | TypeKind::Float => {
                match self.get(path) {
                    Some(raw) => Ok(Some(coerce_scalar(path, raw, kind)?)),
                    None => Ok(None),
                }
            }
            TypeKind::List(elem) | TypeKind::Set(elem) => self.parse_list(path, elem),
            TypeKind::Map(elem) => self.parse_map(path, elem),
        }
    }

    /// Decode `<path>.#` plus `<path>.0..N-1`, in index order
    fn parse_list(&self, path: &str, elem: &TypeKind) -> Result<Option<Value>> {
        let marker = format!("{path}.#");
        let Some(raw_count) = self.get(&marker) else {
            return Ok(None);
        };
        let count = parse_count(&marker, raw_count)?;
        let present = self.indexed_children(path);
        if present.len() != count {
            return Err(HclgenError::decode_error(
                marker,
                format!("count marker says {count}, found {} indexed children", present.len()),
            ));
        }
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let child = format!("{path}.{i}");
            match self.parse_attribute(&child, elem)? {
                Some(value) => items.push(value),
                None => {
                    return Err(HclgenError::decode_error(child, "missing list element"));
                }
            }
        }
        Ok(Some(Value::Seq(items)))
    }

    /// Decode a nested block list: `<path>.#` plus one block body per index
    fn parse_block_list(&self, path: &str, block: &BlockSchema) -> Result<Option<Value>> {
        let marker = format!("{path}.#");
        let Some(raw_count) = self.get(&marker) else {
            return Ok(None);
        };
        let count = parse_count(&marker, raw_count)?;
        let present = self.indexed_children(path);
        if present.len() != count {
            return Err(HclgenError::decode_error(
                marker,
                format!("count marker says {count}, found {} indexed children", present.len()),
            ));
        }
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let child = format!("{path}.{i}");
            items.push(self.parse_block(&child, block)?);
        }
        Ok(Some(Value::Seq(items)))
    }

    /// Decode `<path>.%` plus whatever child keys are actually present.
    ///
    /// Enumeration is materialized in sorted key order; the bag itself
    /// guarantees none.
    fn parse_map(&self, path: &str, elem: &TypeKind) -> Result<Option<Value>> {
        let marker = format!("{path}.%");
        let Some(raw_count) = self.get(&marker) else {
            return Ok(None);
        };
        let count = parse_count(&marker, raw_count)?;
        let keys = self.map_child_keys(path);
        if keys.len() != count {
            return Err(HclgenError::decode_error(
                marker,
                format!("count marker says {count}, found {} map entries", keys.len()),
            ));
        }
        let mut out = IndexMap::new();
        for key in keys {
            let child = format!("{path}.{key}");
            match self.parse_attribute(&child, elem)? {
                Some(value) => {
                    out.insert(key, value);
                }
                None => {
                    return Err(HclgenError::decode_error(child, "missing map entry"));
                }
            }
        }
        Ok(Some(Value::Map(out)))
    }

    /// Distinct first-level numeric indices present under `<path>.`
    fn indexed_children(&self, path: &str) -> BTreeSet<usize> {
        let prefix = format!("{path}.");
        let mut indices = BTreeSet::new();
        for key in self.child_keys(&prefix) {
            let segment = first_segment(key);
            if let Ok(index) = segment.parse::<usize>() {
                indices.insert(index);
            }
        }
        indices
    }

    /// Distinct first-level map keys present under `<path>.`, marker excluded
    fn map_child_keys(&self, path: &str) -> BTreeSet<String> {
        let prefix = format!("{path}.");
        let mut keys = BTreeSet::new();
        for key in self.child_keys(&prefix) {
            let segment = first_segment(key);
            if segment != "%" {
                keys.insert(segment.to_string());
            }
        }
        keys
    }

    /// Non-ignored bag keys under `prefix`, with the prefix stripped
    fn child_keys<'s>(&'s self, prefix: &str) -> Vec<&'s str> {
        self.attributes
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| !self.ignored(key.as_str()))
            .map(|(key, _)| &key[prefix.len()..])
            .collect()
    }
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn first_segment(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

fn parse_count(marker: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| HclgenError::decode_error(marker, format!("count marker is not a number: '{raw}'")))
}

fn coerce_scalar(path: &str, raw: &str, kind: &TypeKind) -> Result<Value> {
    match kind {
        TypeKind::String => Ok(Value::String(raw.to_string())),
        TypeKind::Bool => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(HclgenError::decode_error(
                path,
                format!("cannot coerce '{raw}' to bool"),
            )),
        },
        TypeKind::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
            HclgenError::decode_error(path, format!("cannot coerce '{raw}' to int"))
        }),
        TypeKind::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| {
            HclgenError::decode_error(path, format!("cannot coerce '{raw}' to float"))
        }),
        TypeKind::List(_) | TypeKind::Set(_) | TypeKind::Map(_) => Err(
            HclgenError::decode_error(path, "collection kind where scalar expected"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, Nesting};

    fn bag(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse(bag: &BTreeMap<String, String>, schema: &BlockSchema) -> Result<Value> {
        FlatmapParser::new(bag, &[]).parse(schema)
    }

    #[test]
    fn test_scalar_decode() {
        let schema = BlockSchema::new()
            .with_attribute("ami", AttributeSchema::new(TypeKind::String))
            .with_attribute("monitoring", AttributeSchema::new(TypeKind::Bool).optional())
            .with_attribute("cpu_count", AttributeSchema::new(TypeKind::Int).optional());
        let bag = bag(&[("ami", "ami-123"), ("monitoring", "true"), ("cpu_count", "4")]);

        let tree = parse(&bag, &schema).unwrap();
        let map = tree.as_map().unwrap();
        assert_eq!(map["ami"], Value::from("ami-123"));
        assert_eq!(map["monitoring"], Value::Bool(true));
        assert_eq!(map["cpu_count"], Value::Int(4));
    }

    #[test]
    fn test_absent_scalar_produces_no_node() {
        let schema = BlockSchema::new()
            .with_attribute("description", AttributeSchema::new(TypeKind::String).optional());
        let tree = parse(&bag(&[]), &schema).unwrap();
        assert!(tree.as_map().unwrap().is_empty());

        // explicit empty string is a node
        let tree = parse(&bag(&[("description", "")]), &schema).unwrap();
        assert_eq!(tree.as_map().unwrap()["description"], Value::from(""));
    }

    #[test]
    fn test_list_decode_in_index_order() {
        let schema = BlockSchema::new().with_attribute(
            "subnet_ids",
            AttributeSchema::new(TypeKind::List(Box::new(TypeKind::String))),
        );
        let bag = bag(&[
            ("subnet_ids.#", "2"),
            ("subnet_ids.0", "subnet-b"),
            ("subnet_ids.1", "subnet-a"),
        ]);
        let tree = parse(&bag, &schema).unwrap();
        assert_eq!(
            tree.as_map().unwrap()["subnet_ids"],
            Value::Seq(vec![Value::from("subnet-b"), Value::from("subnet-a")])
        );
    }

    #[test]
    fn test_map_decode() {
        let schema = BlockSchema::new().with_attribute(
            "tags",
            AttributeSchema::new(TypeKind::Map(Box::new(TypeKind::String))).optional(),
        );
        let bag = bag(&[("tags.%", "2"), ("tags.env", "prod"), ("tags.team", "infra")]);
        let tree = parse(&bag, &schema).unwrap();
        let tags = tree.as_map().unwrap()["tags"].as_map().unwrap();
        assert_eq!(tags["env"], Value::from("prod"));
        assert_eq!(tags["team"], Value::from("infra"));
    }

    #[test]
    fn test_count_mismatch_is_decode_error() {
        let schema = BlockSchema::new().with_attribute(
            "tags",
            AttributeSchema::new(TypeKind::Map(Box::new(TypeKind::String))),
        );
        let bag = bag(&[("tags.%", "2"), ("tags.env", "prod")]);
        let err = parse(&bag, &schema).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("tags.%"));
    }

    #[test]
    fn test_bad_bool_is_decode_error() {
        let schema =
            BlockSchema::new().with_attribute("monitoring", AttributeSchema::new(TypeKind::Bool));
        let err = parse(&bag(&[("monitoring", "yes")]), &schema).unwrap_err();
        assert!(err.to_string().contains("monitoring"));
    }

    #[test]
    fn test_nested_block_decode() {
        let schema = BlockSchema::new().with_block(
            "root_block_device",
            Nesting::List,
            BlockSchema::new()
                .with_attribute("volume_size", AttributeSchema::new(TypeKind::Int))
                .with_attribute("volume_type", AttributeSchema::new(TypeKind::String).optional()),
        );
        let bag = bag(&[
            ("root_block_device.#", "1"),
            ("root_block_device.0.volume_size", "50"),
            ("root_block_device.0.volume_type", "gp2"),
        ]);
        let tree = parse(&bag, &schema).unwrap();
        let devices = tree.as_map().unwrap()["root_block_device"].as_seq().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].as_map().unwrap()["volume_size"], Value::Int(50));
    }

    #[test]
    fn test_ignored_keys_are_stripped_before_decode() {
        let schema = BlockSchema::new()
            .with_attribute("ami", AttributeSchema::new(TypeKind::String).optional())
            .with_attribute("arn", AttributeSchema::new(TypeKind::String).optional());
        let bag = bag(&[("ami", "ami-123"), ("arn", "arn:aws:ec2:...")]);
        let ignore = vec![Regex::new("^arn$").unwrap()];
        let tree = FlatmapParser::new(&bag, &ignore).parse(&schema).unwrap();
        let map = tree.as_map().unwrap();
        assert!(map.contains_key("ami"));
        assert!(!map.contains_key("arn"));
    }
}
