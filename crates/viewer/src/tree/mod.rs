//! Span hierarchy reconstruction.
//!
//! Consumes the parser's entry list and produces an immutable tree of
//! spans: entries grouped by span id, parents linked, start/completion
//! markers classified, roots and children chronologically sorted.

pub mod build;
pub mod model;

pub use build::build_tree;
pub use model::{Span, Tree, TreeStats};
