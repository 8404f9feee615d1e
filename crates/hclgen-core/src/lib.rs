//! hclgen core
//!
//! Core engine for turning captured cloud resource state into
//! deterministic, human-reviewable HCL. The pipeline is a small compiler
//! backend: decode flat attribute bags into typed trees, prune them against
//! the resource schema, assemble a document, canonicalize an explicit parse
//! tree, pretty-print, and run compatibility rewrites over the printed
//! lines. Identical inputs always produce byte-identical output.

pub mod document;
pub mod error;
pub mod flatmap;
pub mod hcl;
pub mod prune;
pub mod render;
pub mod resource;
pub mod result;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use document::{Document, MapShapes, OrderingHints, output_references, provider_document};
pub use error::{ErrorKind, HclgenError};
pub use flatmap::FlatmapParser;
pub use prune::prune;
pub use render::{OutputFormat, RenderOptions, render, render_resources, render_with};
pub use resource::{Resource, sanitize_name};
pub use result::{Result, ResultExt};
pub use schema::{AttributeSchema, BlockSchema, NestedBlock, Nesting, TypeKind};
pub use value::Value;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hclgen=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
