//! Read operations over a finished parse: the contract the HTTP layer
//! exposes. Each user-facing failure is a distinct variant so the serving
//! layer can map it to a distinct response.

use thiserror::Error;

use crate::parser::Entry;
use crate::tree::Tree;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("span parameter required")]
    MissingSpanId,

    #[error("span not found: {0}")]
    SpanNotFound(String),

    #[error("search query must not be empty")]
    EmptyQuery,
}

/// All entries belonging to one span, in input order.
pub fn span_entries<'a>(tree: &'a Tree, span_id: &str) -> Result<&'a [Entry], QueryError> {
    if span_id.is_empty() {
        return Err(QueryError::MissingSpanId);
    }
    tree.spans
        .get(span_id)
        .map(|span| span.entries.as_slice())
        .ok_or_else(|| QueryError::SpanNotFound(span_id.to_owned()))
}

/// Case-insensitive substring search over every parsed entry, span-less
/// ones included. An entry matches when its message or any attribute
/// value contains the query.
pub fn search_entries<'a>(entries: &'a [Entry], query: &str) -> Result<Vec<&'a Entry>, QueryError> {
    if query.is_empty() {
        return Err(QueryError::EmptyQuery);
    }

    let query = query.to_lowercase();
    Ok(entries
        .iter()
        .filter(|entry| matches_query(entry, &query))
        .collect())
}

fn matches_query(entry: &Entry, lowered_query: &str) -> bool {
    if entry.message.to_lowercase().contains(lowered_query) {
        return true;
    }
    entry
        .attrs
        .values()
        .any(|value| value.to_lowercase().contains(lowered_query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    fn entry(message: &str, span: &str) -> Entry {
        Entry {
            level: "INFO".to_owned(),
            message: message.to_owned(),
            span: span.to_owned(),
            ..Entry::default()
        }
    }

    #[test]
    fn test_span_entries() {
        let entries = vec![
            entry("a started", "a"),
            entry("working", "a"),
            entry("b started", "b"),
        ];
        let tree = build_tree(&entries);

        let logs = span_entries(&tree, "a").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].message, "working");
    }

    #[test]
    fn test_span_entries_errors_are_distinct() {
        let tree = build_tree(&[entry("a started", "a")]);

        assert_eq!(span_entries(&tree, ""), Err(QueryError::MissingSpanId));
        assert_eq!(
            span_entries(&tree, "nope"),
            Err(QueryError::SpanNotFound("nope".to_owned()))
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let entries = vec![entry("Fetching Agents", "a"), entry("other", "a")];

        let matches = search_entries(&entries, "fetching").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].message, "Fetching Agents");
    }

    #[test]
    fn test_search_covers_attribute_values() {
        let mut e = entry("processing", "a");
        e.attrs
            .insert("device_id".to_owned(), "Device-001".to_owned());
        let entries = vec![e, entry("unrelated", "b")];

        let matches = search_entries(&entries, "device-0").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_search_includes_span_less_entries() {
        let entries = vec![entry("floating note", "")];
        let matches = search_entries(&entries, "floating").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_empty_query_rejected() {
        assert_eq!(search_entries(&[], ""), Err(QueryError::EmptyQuery));
    }
}
