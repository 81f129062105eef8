use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::parser::Entry;

/// One aggregation node in the reconstructed hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Span {
    /// Opaque span identifier, as emitted.
    pub id: String,
    /// Name derived from the span's start marker; empty if none was seen.
    pub name: String,
    /// Declared parent id, empty if none. May point at an unknown span,
    /// in which case this span was promoted to a root.
    pub parent: String,
    /// Child span ids, chronologically sorted.
    pub children: Vec<String>,
    /// Timestamp of the first start marker, if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Duration attribute from the last completion marker that carried
    /// one, verbatim. Empty if none.
    pub duration: String,
    /// Every entry carrying this span id, in input order.
    pub entries: Vec<Entry>,
}

impl Span {
    pub(crate) fn new(id: String) -> Self {
        Span {
            id,
            ..Span::default()
        }
    }
}

/// The reconstruction result for one capture. Built once, read-only
/// afterwards; reloading a capture builds a fresh tree.
#[derive(Debug, Default)]
pub struct Tree {
    /// Root span ids (no parent, or parent unknown), chronologically sorted.
    pub roots: Vec<String>,
    /// All spans indexed by id.
    pub spans: HashMap<String, Span>,
}

/// Aggregate counters over one tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total_spans: usize,
    pub total_logs: usize,
    /// Occurrences per level name across all grouped entries.
    pub levels: HashMap<String, usize>,
}

impl Tree {
    /// Count spans, grouped entries, and per-level occurrences. Entries
    /// that never joined a span are not counted here.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();

        for span in self.spans.values() {
            stats.total_spans += 1;
            stats.total_logs += span.entries.len();
            for entry in &span.entries {
                *stats.levels.entry(entry.level.clone()).or_default() += 1;
            }
        }

        stats
    }
}
