//! Log capture parsing and normalization.
//!
//! Raw bytes go in, an ordered list of normalized [`Entry`] values comes
//! out. The capture format (key=value text or JSON lines) is detected
//! once from the first non-blank line; malformed lines are skipped, never
//! fatal. Only a read failure of the underlying stream aborts a parse.

pub mod json;
pub mod logfmt;
pub mod model;
pub mod stream;

pub use model::{Entry, LogFormat, ParseError, ParseResult};
pub use stream::parse;
