/// Correlation identifiers for the current unit of work.
///
/// A small immutable pair, passed explicitly to every operation that
/// logs. [`Logger::start`](crate::Logger::start) builds the context for a
/// child span from its parent's; there is no ambient fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    span: String,
    parent: String,
}

impl SpanContext {
    pub fn new(span: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            span: span.into(),
            parent: parent.into(),
        }
    }

    /// The current span id.
    pub fn span_id(&self) -> &str {
        &self.span
    }

    /// The parent span id, empty when this span is a root.
    pub fn parent_id(&self) -> &str {
        &self.parent
    }
}
