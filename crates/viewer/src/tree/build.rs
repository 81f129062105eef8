//! Hierarchy reconstruction from a flat entry list.

use std::collections::hash_map::Entry as MapEntry;

use crate::parser::Entry;

use super::model::{Span, Tree};

/// Build the span hierarchy from parsed entries.
///
/// Two passes: group entries by span id, then link spans to parents and
/// pick the roots. A span whose declared parent is unknown is promoted to
/// a root rather than dropped. Total — any input yields a tree, an empty
/// list yields an empty one.
pub fn build_tree(entries: &[Entry]) -> Tree {
    let mut tree = Tree::default();
    // Span ids in first-seen order. The linking pass and the sort below
    // run in this order so identical input always yields an identical
    // tree, including tie-breaks among equal start times.
    let mut discovered: Vec<String> = Vec::new();

    // Pass 1: group entries by span id.
    for entry in entries {
        if entry.span.is_empty() {
            continue;
        }

        let span = match tree.spans.entry(entry.span.clone()) {
            MapEntry::Occupied(slot) => slot.into_mut(),
            MapEntry::Vacant(slot) => {
                discovered.push(entry.span.clone());
                slot.insert(Span::new(entry.span.clone()))
            }
        };

        // First entry that declares a parent wins.
        if span.parent.is_empty() && !entry.parent.is_empty() {
            span.parent = entry.parent.clone();
        }

        if is_start_marker(&entry.message) {
            if span.name.is_empty() {
                span.name = name_from_start(&entry.message).to_owned();
            }
            if span.start_time.is_none() {
                span.start_time = entry.time;
            }
        }
        if is_completion_marker(&entry.message) {
            if let Some(duration) = entry.attrs.get("duration") {
                span.duration = duration.clone();
            }
        }

        span.entries.push(entry.clone());
    }

    // Pass 2: link children and pick roots.
    for id in &discovered {
        let parent_id = tree
            .spans
            .get(id)
            .map(|span| span.parent.clone())
            .unwrap_or_default();

        // A self-declared parent would put the span inside its own
        // children list; promote it instead.
        if parent_id.is_empty() || parent_id == *id {
            tree.roots.push(id.clone());
            continue;
        }

        match tree.spans.get_mut(&parent_id) {
            Some(parent) => parent.children.push(id.clone()),
            None => tree.roots.push(id.clone()), // orphan
        }
    }

    sort_by_start_time(&mut tree, &discovered);

    tree
}

/// Sort roots and every multi-child list ascending by start time. A span
/// without a start time sorts first. `sort_by_key` is stable, so spans
/// with equal start times keep discovery order.
fn sort_by_start_time(tree: &mut Tree, span_ids: &[String]) {
    let mut roots = std::mem::take(&mut tree.roots);
    roots.sort_by_key(|id| tree.spans.get(id).and_then(|span| span.start_time));
    tree.roots = roots;

    for id in span_ids {
        let mut children = match tree.spans.get_mut(id) {
            Some(span) if span.children.len() > 1 => std::mem::take(&mut span.children),
            _ => continue,
        };
        children.sort_by_key(|child| tree.spans.get(child).and_then(|span| span.start_time));
        if let Some(span) = tree.spans.get_mut(id) {
            span.children = children;
        }
    }
}

/// `"started"` or any message ending in `" started"`.
fn is_start_marker(message: &str) -> bool {
    message == "started" || message.ends_with(" started")
}

/// `"completed"` or any message ending in `" completed"`.
fn is_completion_marker(message: &str) -> bool {
    message == "completed" || message.ends_with(" completed")
}

/// `"fetch-agents started"` → `"fetch-agents"`. The bare marker keeps
/// itself as the name.
fn name_from_start(message: &str) -> &str {
    message.strip_suffix(" started").unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 12, 4, 10, 0, secs).unwrap())
    }

    fn entry(time: Option<DateTime<Utc>>, message: &str, span: &str, parent: &str) -> Entry {
        Entry {
            time,
            level: "INFO".to_owned(),
            message: message.to_owned(),
            span: span.to_owned(),
            parent: parent.to_owned(),
            attrs: Default::default(),
        }
    }

    fn with_duration(mut e: Entry, duration: &str) -> Entry {
        e.attrs.insert("duration".to_owned(), duration.to_owned());
        e
    }

    #[test]
    fn test_simple_hierarchy() {
        let entries = vec![
            entry(at(0), "main started", "aaa", ""),
            entry(at(1), "child started", "bbb", "aaa"),
            with_duration(entry(at(2), "child completed", "bbb", "aaa"), "10ms"),
            with_duration(entry(at(3), "main completed", "aaa", ""), "50ms"),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.roots, vec!["aaa"]);
        assert_eq!(tree.spans.len(), 2);

        let root = &tree.spans["aaa"];
        assert_eq!(root.name, "main");
        assert_eq!(root.duration, "50ms");
        assert_eq!(root.children, vec!["bbb"]);

        let child = &tree.spans["bbb"];
        assert_eq!(child.name, "child");
        assert_eq!(child.parent, "aaa");
        assert_eq!(child.duration, "10ms");
        assert!(child.children.is_empty());
    }

    #[test]
    fn test_deep_nesting() {
        let entries = vec![
            entry(at(0), "level1 started", "l1", ""),
            entry(at(1), "level2 started", "l2", "l1"),
            entry(at(2), "level3 started", "l3", "l2"),
            entry(at(3), "level3 completed", "l3", "l2"),
            entry(at(4), "level2 completed", "l2", "l1"),
            entry(at(5), "level1 completed", "l1", ""),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.roots, vec!["l1"]);
        assert_eq!(tree.spans["l1"].children, vec!["l2"]);
        assert_eq!(tree.spans["l2"].children, vec!["l3"]);
        assert!(tree.spans["l3"].children.is_empty());
    }

    #[test]
    fn test_orphan_is_promoted_to_root() {
        let entries = vec![entry(at(0), "orphan started", "orphan", "missing")];

        let tree = build_tree(&entries);

        assert_eq!(tree.roots, vec!["orphan"]);
        assert_eq!(tree.spans["orphan"].parent, "missing");
    }

    #[test]
    fn test_roots_sorted_by_start_time_not_input_order() {
        let entries = vec![
            entry(at(2), "third started", "ccc", ""),
            entry(at(1), "second started", "bbb", ""),
            entry(at(0), "first started", "aaa", ""),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.roots, vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_children_sorted_by_start_time() {
        let entries = vec![
            entry(at(0), "main started", "root", ""),
            entry(at(3), "late started", "late", "root"),
            entry(at(1), "early started", "early", "root"),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.spans["root"].children, vec!["early", "late"]);
    }

    #[test]
    fn test_missing_start_time_sorts_first() {
        let entries = vec![
            entry(at(1), "timed started", "timed", ""),
            entry(None, "untimed started", "untimed", ""),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.roots, vec!["untimed", "timed"]);
    }

    #[test]
    fn test_first_parent_wins() {
        let entries = vec![
            entry(at(0), "work started", "kid", "p1"),
            entry(at(1), "still working", "kid", "p2"),
            entry(at(2), "p1 started", "p1", ""),
            entry(at(3), "p2 started", "p2", ""),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.spans["kid"].parent, "p1");
        assert_eq!(tree.spans["p1"].children, vec!["kid"]);
        assert!(tree.spans["p2"].children.is_empty());
    }

    #[test]
    fn test_last_completion_duration_wins() {
        let entries = vec![
            entry(at(0), "job started", "job", ""),
            with_duration(entry(at(1), "job completed", "job", ""), "10ms"),
            with_duration(entry(at(2), "job completed", "job", ""), "20ms"),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.spans["job"].duration, "20ms");
    }

    #[test]
    fn test_start_time_first_wins_and_name_set_once() {
        let entries = vec![
            entry(at(2), "first started", "s", ""),
            entry(at(0), "second started", "s", ""),
        ];

        let tree = build_tree(&entries);

        let span = &tree.spans["s"];
        assert_eq!(span.name, "first");
        assert_eq!(span.start_time, at(2));
    }

    #[test]
    fn test_bare_markers() {
        let entries = vec![
            entry(at(0), "started", "s", ""),
            with_duration(entry(at(1), "completed", "s", ""), "1ms"),
        ];

        let tree = build_tree(&entries);

        let span = &tree.spans["s"];
        assert_eq!(span.name, "started");
        assert_eq!(span.duration, "1ms");
    }

    #[test]
    fn test_span_less_entries_are_ignored() {
        let entries = vec![
            entry(at(0), "no span here", "", ""),
            entry(at(1), "work started", "s", ""),
        ];

        let tree = build_tree(&entries);

        assert_eq!(tree.spans.len(), 1);
        assert_eq!(tree.spans["s"].entries.len(), 1);
    }

    #[test]
    fn test_every_spanned_entry_grouped_exactly_once() {
        let entries = vec![
            entry(at(0), "a started", "a", ""),
            entry(at(1), "note", "a", ""),
            entry(at(2), "b started", "b", "a"),
            entry(at(3), "stray", "", ""),
            entry(at(4), "b completed", "b", "a"),
        ];

        let tree = build_tree(&entries);

        let grouped: usize = tree.spans.values().map(|s| s.entries.len()).sum();
        let spanned = entries.iter().filter(|e| !e.span.is_empty()).count();
        assert_eq!(grouped, spanned);
    }

    #[test]
    fn test_forest_property() {
        let entries = vec![
            entry(at(0), "a started", "a", ""),
            entry(at(1), "b started", "b", "a"),
            entry(at(2), "c started", "c", "a"),
            entry(at(3), "d started", "d", "ghost"),
        ];

        let tree = build_tree(&entries);

        // Every span id appears exactly once: either in roots or in
        // exactly one children list.
        let mut placements: Vec<&String> = tree.roots.iter().collect();
        for span in tree.spans.values() {
            placements.extend(span.children.iter());
        }
        placements.sort();
        let mut ids: Vec<&String> = tree.spans.keys().collect();
        ids.sort();
        assert_eq!(placements, ids);
    }

    #[test]
    fn test_idempotence() {
        let entries = vec![
            entry(at(1), "b started", "b", ""),
            entry(at(1), "a started", "a", ""),
            entry(at(1), "c started", "c", "a"),
            entry(at(1), "d started", "d", "a"),
        ];

        let first = build_tree(&entries);
        let second = build_tree(&entries);

        assert_eq!(first.roots, second.roots);
        for (id, span) in &first.spans {
            assert_eq!(span.children, second.spans[id].children);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_tree() {
        let tree = build_tree(&[]);
        assert!(tree.roots.is_empty());
        assert!(tree.spans.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut warn = entry(at(1), "odd state", "a", "");
        warn.level = "WARN".to_owned();
        let entries = vec![
            entry(at(0), "a started", "a", ""),
            warn,
            entry(at(2), "b started", "b", "a"),
            entry(at(3), "span-less", "", ""),
        ];

        let tree = build_tree(&entries);
        let stats = tree.stats();

        assert_eq!(stats.total_spans, 2);
        assert_eq!(stats.total_logs, 3);
        assert_eq!(stats.levels.get("INFO"), Some(&2));
        assert_eq!(stats.levels.get("WARN"), Some(&1));
    }
}
