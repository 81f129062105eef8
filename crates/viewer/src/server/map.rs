//! Wire types for the REST API and their mapping from the core model.
//!
//! Absent values serialize as empty strings/lists/objects, never as null
//! or a missing field, so clients see one uniform schema.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::parser::Entry;
use crate::tree::{Span, Tree, TreeStats};

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub roots: Vec<String>,
    pub spans: HashMap<String, SpanBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanBody {
    pub id: String,
    pub name: String,
    pub parent: String,
    pub children: Vec<String>,
    pub start_time: String,
    pub duration: String,
    pub log_count: usize,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogBody>,
}

#[derive(Debug, Serialize)]
pub struct LogBody {
    pub time: String,
    pub level: String,
    pub message: String,
    pub span: String,
    pub parent: String,
    pub attrs: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_spans: usize,
    pub total_logs: usize,
    pub levels: HashMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub matches: Vec<LogBody>,
    pub total: usize,
}

pub fn tree_response(tree: &Tree) -> TreeResponse {
    TreeResponse {
        roots: tree.roots.clone(),
        spans: tree
            .spans
            .iter()
            .map(|(id, span)| (id.clone(), span_body(span)))
            .collect(),
    }
}

fn span_body(span: &Span) -> SpanBody {
    SpanBody {
        id: span.id.clone(),
        name: span.name.clone(),
        parent: span.parent.clone(),
        children: span.children.clone(),
        start_time: format_time(span.start_time),
        duration: span.duration.clone(),
        log_count: span.entries.len(),
    }
}

pub fn log_body(entry: &Entry) -> LogBody {
    LogBody {
        time: format_time(entry.time),
        level: entry.level.clone(),
        message: entry.message.clone(),
        span: entry.span.clone(),
        parent: entry.parent.clone(),
        attrs: entry.attrs.clone(),
    }
}

pub fn stats_response(stats: TreeStats) -> StatsResponse {
    StatsResponse {
        total_spans: stats.total_spans,
        total_logs: stats.total_logs,
        levels: stats.levels,
    }
}

/// RFC 3339 with millisecond precision; empty string when absent.
fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
