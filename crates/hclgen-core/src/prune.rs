//! Schema-directed pruning of decoded resource trees
//!
//! Captured state echoes every attribute the provider reported, most of
//! which a human never wrote. Optional attributes that sit at their zero
//! value are deleted so the emitted configuration only contains meaningful
//! content. Keys absent from the schema pass through untouched.

use regex::Regex;

use crate::schema::BlockSchema;
use crate::value::Value;

/// Provider-inferred ownership attribute. An explicit value at the document
/// root causes drift against the provider's own inference, so a
/// schema-declared computed `project` is deleted there regardless of value.
/// The same-named attribute inside nested blocks has a different meaning and
/// is left alone.
const OWNERSHIP_ATTRIBUTE: &str = "project";

/// Prune `tree` in place against `schema`.
///
/// `allow_empty` patterns exempt a dotted attribute path (list indices
/// excluded) from zero-value pruning.
pub fn prune(tree: &mut Value, schema: &BlockSchema, allow_empty: &[Regex]) {
    if let Some(attr) = schema.attributes.get(OWNERSHIP_ATTRIBUTE) {
        if attr.computed {
            if let Some(map) = tree.as_map_mut() {
                map.shift_remove(OWNERSHIP_ATTRIBUTE);
            }
        }
    }
    prune_block(tree, schema, allow_empty, "");
}

fn prune_block(tree: &mut Value, schema: &BlockSchema, allow_empty: &[Regex], prefix: &str) {
    let Some(map) = tree.as_map_mut() else {
        return;
    };

    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        if let Some(attr) = schema.attributes.get(&key) {
            if attr.optional {
                let zero = map.get(&key).is_some_and(Value::is_zero);
                if zero && !allow_empty.iter().any(|re| re.is_match(&path)) {
                    map.shift_remove(&key);
                    continue;
                }
            }
        }

        if let Some(nested) = schema.block_types.get(&key) {
            if let Some(Value::Seq(items)) = map.get_mut(&key) {
                for item in items {
                    prune_block(item, &nested.block, allow_empty, &path);
                }
            }
        }
    }
}
