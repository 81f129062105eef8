//! Tokenizer and line parser for the text (key=value) log format.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::model::Entry;

/// Parse one line of space-separated `key=value` tokens into a map.
///
/// Values containing spaces are double-quoted; inside quotes `\n`, `\t`,
/// `\r`, `\"` and `\\` are escapes, any other `\X` is a literal `X`. An
/// unterminated quote consumes to end of line. Tokens without `=` are
/// skipped. A repeated key keeps its last value.
///
/// This never fails; worst case it returns an empty or partial map.
pub fn parse_key_value_pairs(line: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        // Key runs until '=' or the end of the token.
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ' ' {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            // No '=' in this token, skip it entirely.
            while let Some(&c) = chars.peek() {
                if c == ' ' {
                    break;
                }
                chars.next();
            }
            continue;
        }
        chars.next(); // consume '='

        let value = if chars.peek() == Some(&'"') {
            chars.next(); // consume opening quote
            let mut val = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' => match chars.next() {
                        Some('n') => val.push('\n'),
                        Some('t') => val.push('\t'),
                        Some('r') => val.push('\r'),
                        Some(other) => val.push(other),
                        // Trailing backslash in an unterminated quote.
                        None => val.push('\\'),
                    },
                    _ => val.push(c),
                }
            }
            val
        } else {
            // Unquoted value runs until the next space.
            let mut val = String::new();
            while let Some(&c) = chars.peek() {
                if c == ' ' {
                    break;
                }
                val.push(c);
                chars.next();
            }
            val
        };

        pairs.insert(key, value);
    }

    pairs
}

/// Parse one text-format line into an [`Entry`]. Total — unknown tokens
/// land in `attrs`, garbage tokens are dropped, a bad timestamp leaves
/// `time` unset. The validity gate is applied by the stream parser.
pub fn parse_text_line(line: &str) -> Entry {
    let mut entry = Entry::default();

    for (key, value) in parse_key_value_pairs(line) {
        match key.as_str() {
            "time" => entry.time = parse_timestamp(&value),
            "level" => entry.level = value,
            "msg" => entry.message = value,
            "span" => entry.span = value,
            "parent" => entry.parent = value,
            _ => {
                entry.attrs.insert(key, value);
            }
        }
    }

    entry
}

/// RFC 3339 with optional fractional seconds and zone offset.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
