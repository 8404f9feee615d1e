//! Resource type schemas
//!
//! Schemas are supplied by the upstream provider layer and consumed here as
//! an immutable description of each resource type: which attributes exist,
//! their primitive or collection kind, whether they are optional or
//! provider-computed, and which nested block types a body may carry. The
//! decoder walks the schema to rebuild nesting from the flat attribute bag;
//! the pruner walks it to decide what is safe to drop.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type of a single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    String,
    Bool,
    Int,
    Float,
    List(Box<TypeKind>),
    Set(Box<TypeKind>),
    Map(Box<TypeKind>),
}

/// Schema for one attribute of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub kind: TypeKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
}

impl AttributeSchema {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            optional: false,
            computed: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

/// How a nested block type repeats inside its parent.
///
/// Both variants are list-encoded in the flat bag (`<path>.#`); `Set` bodies
/// additionally receive no protection from canonical resorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    List,
    Set,
}

/// Schema for a nested block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    pub nesting: Nesting,
    pub block: BlockSchema,
}

/// Schema for a block body: named attributes plus named nested block types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeSchema>,
    #[serde(default)]
    pub block_types: IndexMap<String, NestedBlock>,
}

impl BlockSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute (builder style, used heavily in tests)
    pub fn with_attribute(mut self, name: impl Into<String>, schema: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), schema);
        self
    }

    /// Add a nested block type
    pub fn with_block(mut self, name: impl Into<String>, nesting: Nesting, block: BlockSchema) -> Self {
        self.block_types.insert(name.into(), NestedBlock { nesting, block });
        self
    }
}
