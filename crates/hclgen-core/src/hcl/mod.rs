//! HCL emission
//!
//! The document's value tree is encoded into an explicit parse tree,
//! canonicalized (label merging, key quoting, heredoc restoration,
//! deterministic sibling ordering), pretty-printed, and finally patched by
//! the line-level compatibility rewriter. The parse tree exists only to
//! drive printing and is discarded afterwards.

pub mod ast;
pub mod canonicalize;
pub mod encode;
pub mod printer;
pub mod rewrite;

pub use ast::{Body, Expr, Item, Key};
pub use canonicalize::canonicalize;
pub use encode::encode_document;
pub use printer::print_file;
pub use rewrite::rewrite;
