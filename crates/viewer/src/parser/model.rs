use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Detected log capture format.
///
/// Detection happens once per stream, from the first non-blank line.
/// Every subsequent line is parsed with the same format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Space-separated key=value pairs, values optionally double-quoted.
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    /// Entry timestamp. `None` when the line carried no parseable time.
    pub time: Option<DateTime<Utc>>,
    /// Log level as written (DEBUG/INFO/WARN/ERROR by convention, not validated).
    pub level: String,
    /// Human-readable message text.
    pub message: String,
    /// Span this entry belongs to. Empty means the entry is span-less.
    pub span: String,
    /// Parent of the owning span. Empty means no declared parent.
    pub parent: String,
    /// Every non-reserved key on the line, values verbatim.
    pub attrs: HashMap<String, String>,
}

impl Entry {
    /// An entry is usable only when it carries both a level and a message.
    pub fn is_valid(&self) -> bool {
        !self.level.is_empty() && !self.message.is_empty()
    }
}

/// All entries parsed from one capture, in input order.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub entries: Vec<Entry>,
    /// `None` only when the input had no non-blank lines.
    pub format: Option<LogFormat>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying stream could not be read. Fatal to the whole parse,
    /// no partial result is returned.
    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),

    /// A single line was not a JSON object. The stream parser skips the
    /// line and continues.
    #[error("invalid JSON line: {0}")]
    Json(#[from] serde_json::Error),
}
