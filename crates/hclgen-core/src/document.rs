//! Document assembly
//!
//! Groups decoded resource trees by type and name into a single renderable
//! document, together with the request-scoped lookup tables the later
//! stages need: which attribute paths were genuinely maps (as opposed to
//! one-element block lists, a distinction the generic tree encoding erases)
//! and which paths carry ordering hints.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::resource::Resource;
use crate::value::Value;

static INDEX_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[0-9]+").expect("valid index pattern"));

/// Index-stripped attribute paths known to have originated as true maps
pub type MapShapes = BTreeSet<String>;

/// (resource type, resource name) -> dotted logical paths whose lists must
/// retain original relative order
pub type OrderingHints = HashMap<String, HashMap<String, Vec<String>>>;

/// One fully assembled document, ready for rendering
#[derive(Debug, Clone, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
    map_shapes: MapShapes,
    hints: OrderingHints,
}

impl Document {
    /// Assemble decoded resources plus optional provider data.
    ///
    /// A `(type, name)` collision keeps the first occurrence, discards the
    /// duplicate and records a non-fatal warning. Resources that never
    /// decoded (no item) are skipped the same way.
    pub fn from_resources(resources: &[Resource], provider_data: IndexMap<String, Value>) -> Self {
        let mut resources_by_type: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();
        let mut map_shapes = BTreeSet::new();
        let mut hints: OrderingHints = HashMap::new();

        for resource in resources {
            let Some(item) = &resource.item else {
                tracing::warn!("skipping undecoded resource: {}", resource.address());
                continue;
            };

            let by_name = resources_by_type
                .entry(resource.resource_type.clone())
                .or_default();
            if by_name.contains_key(&resource.resource_name) {
                tracing::warn!("duplicate resource found: {}", resource.address());
                continue;
            }
            by_name.insert(resource.resource_name.clone(), item.clone());

            for key in resource.attributes.keys() {
                if let Some(path) = key.strip_suffix(".%") {
                    map_shapes.insert(INDEX_SEGMENT.replace_all(path, "").into_owned());
                }
            }

            if !resource.preserve_order.is_empty() {
                hints
                    .entry(resource.resource_type.clone())
                    .or_default()
                    .insert(resource.resource_name.clone(), resource.preserve_order.clone());
            }
        }

        let mut data = IndexMap::new();
        if !resources_by_type.is_empty() {
            data.insert(
                "resource".to_string(),
                Value::Map(
                    resources_by_type
                        .into_iter()
                        .map(|(k, v)| (k, Value::Map(v)))
                        .collect(),
                ),
            );
        }
        if !provider_data.is_empty() {
            data.insert("provider".to_string(), Value::Map(provider_data));
        }

        Self {
            data,
            map_shapes,
            hints,
        }
    }

    /// Wrap an already shaped top-level data map (provider files, output
    /// files) with no hint or map-shape tables.
    pub fn from_data(data: IndexMap<String, Value>) -> Self {
        Self {
            data,
            map_shapes: BTreeSet::new(),
            hints: HashMap::new(),
        }
    }

    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn map_shapes(&self) -> &MapShapes {
        &self.map_shapes
    }

    pub fn hints(&self) -> &OrderingHints {
        &self.hints
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Build one `output` block entry per resource, referencing its id key.
///
/// Entry `<type>_<name>_<idkey>` carries value `"${<type>.<name>.<idkey>}"`
/// so generated files can be linked from other configuration.
pub fn output_references(resources: &[Resource]) -> IndexMap<String, Value> {
    let mut outputs = IndexMap::new();
    for resource in resources {
        let id_key = resource.id_key();
        let name = format!(
            "{}_{}_{}",
            resource.resource_type, resource.resource_name, id_key
        );
        let reference = format!(
            "${{{}.{}.{}}}",
            resource.resource_type, resource.resource_name, id_key
        );
        let mut body = IndexMap::new();
        body.insert("value".to_string(), Value::String(reference));
        outputs.insert(name, Value::Map(body));
    }
    outputs
}

/// Build the provider file document: the provider block itself plus the
/// `terraform.required_providers` pin for it.
pub fn provider_document(
    name: &str,
    version: &str,
    source: Option<&str>,
    provider_data: IndexMap<String, Value>,
) -> Document {
    let mut provider_config = IndexMap::new();
    provider_config.insert("version".to_string(), Value::from(version));
    if let Some(source) = source {
        provider_config.insert("source".to_string(), Value::from(source));
    }

    let mut provider = IndexMap::new();
    provider.insert(name.to_string(), Value::Map(provider_data));

    let mut required = IndexMap::new();
    required.insert(name.to_string(), Value::Map(provider_config));

    let mut terraform = IndexMap::new();
    terraform.insert(
        "required_providers".to_string(),
        Value::Seq(vec![Value::Map(required)]),
    );

    let mut data = IndexMap::new();
    data.insert("provider".to_string(), Value::Map(provider));
    data.insert("terraform".to_string(), Value::Map(terraform));
    Document::from_data(data)
}
