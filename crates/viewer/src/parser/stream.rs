//! Whole-capture parsing: format detection plus the line loop.

use std::io::BufRead;

use tracing::debug;

use super::json::parse_json_line;
use super::logfmt::parse_text_line;
use super::model::{LogFormat, ParseError, ParseResult};

/// Classify a capture from its first non-blank line. JSON objects start
/// with `{`, anything else is treated as key=value text.
fn detect_format(first_line: &str) -> LogFormat {
    if first_line.starts_with('{') {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

/// Parse a complete log capture.
///
/// Blank lines, lines that fail to parse under the detected format, and
/// lines missing a level or message are skipped silently; the entries
/// that survive keep their input order. Only a read failure of the
/// underlying stream is fatal, and then no partial result is returned.
pub fn parse<R: BufRead>(reader: R) -> Result<ParseResult, ParseError> {
    let mut result = ParseResult::default();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let format = *result.format.get_or_insert_with(|| detect_format(line));

        let entry = match format {
            LogFormat::Json => match parse_json_line(line) {
                Ok(entry) => entry,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            },
            LogFormat::Text => parse_text_line(line),
        };

        if !entry.is_valid() {
            skipped += 1;
            continue;
        }

        result.entries.push(entry);
    }

    if skipped > 0 {
        debug!(skipped, "dropped unparsable or incomplete lines");
    }

    Ok(result)
}
