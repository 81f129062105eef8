use std::sync::Arc;

use crate::parser::{Entry, LogFormat};
use crate::tree::Tree;

/// One fully loaded capture: the parsed entries and the tree built from
/// them. Never mutated after construction — a reload builds a fresh
/// snapshot, so concurrent readers of the old one are unaffected.
#[derive(Debug)]
pub struct Snapshot {
    pub tree: Tree,
    pub entries: Vec<Entry>,
    pub format: Option<LogFormat>,
}

/// Shared read-only handle used by the HTTP layer.
pub type SharedSnapshot = Arc<Snapshot>;
