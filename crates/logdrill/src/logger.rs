//! The logger handle and span lifecycle.

use std::fmt::Write as _;
use std::io::Write;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;

use crate::context::SpanContext;
use crate::id;

/// Log severity, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Custom span id source, mainly for deterministic tests.
pub type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

pub struct LoggerOptions {
    /// Records below this level are dropped.
    pub min_level: Level,
    /// Span id generator; `None` uses the 8-hex-char default.
    pub id_gen: Option<IdGenerator>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            id_gen: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Text,
    Json,
}

/// An explicitly constructed logging handle.
///
/// The caller builds one and threads it (by reference) wherever logging
/// happens. The handle is `Sync`; concurrent writers serialize on the
/// sink lock so lines never interleave.
pub struct Logger {
    sink: Mutex<Box<dyn Write + Send>>,
    format: Format,
    min_level: Level,
    id_gen: Option<IdGenerator>,
}

impl Logger {
    /// key=value lines, viewer text format.
    pub fn text(sink: impl Write + Send + 'static) -> Self {
        Self::text_with(sink, LoggerOptions::default())
    }

    pub fn text_with(sink: impl Write + Send + 'static, opts: LoggerOptions) -> Self {
        Self::new(sink, Format::Text, opts)
    }

    /// One JSON object per line, viewer JSON format.
    pub fn json(sink: impl Write + Send + 'static) -> Self {
        Self::json_with(sink, LoggerOptions::default())
    }

    pub fn json_with(sink: impl Write + Send + 'static, opts: LoggerOptions) -> Self {
        Self::new(sink, Format::Json, opts)
    }

    fn new(sink: impl Write + Send + 'static, format: Format, opts: LoggerOptions) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            format,
            min_level: opts.min_level,
            id_gen: opts.id_gen,
        }
    }

    /// Begin a span: logs `"<name> started"` and returns the new context
    /// plus a guard that logs `"<name> completed"` with a `duration`
    /// attribute when finished (or dropped).
    pub fn start(&self, parent: Option<&SpanContext>, name: &str) -> (SpanContext, SpanGuard<'_>) {
        let ctx = SpanContext::new(
            self.next_span_id(),
            parent.map(|p| p.span_id().to_owned()).unwrap_or_default(),
        );

        self.log(Level::Info, Some(&ctx), &format!("{name} started"), &[]);

        let guard = SpanGuard {
            logger: self,
            ctx: ctx.clone(),
            name: name.to_owned(),
            started: Instant::now(),
            finished: false,
        };
        (ctx, guard)
    }

    pub fn debug(&self, ctx: Option<&SpanContext>, msg: &str, attrs: &[(&str, &str)]) {
        self.log(Level::Debug, ctx, msg, attrs);
    }

    pub fn info(&self, ctx: Option<&SpanContext>, msg: &str, attrs: &[(&str, &str)]) {
        self.log(Level::Info, ctx, msg, attrs);
    }

    pub fn warn(&self, ctx: Option<&SpanContext>, msg: &str, attrs: &[(&str, &str)]) {
        self.log(Level::Warn, ctx, msg, attrs);
    }

    pub fn error(&self, ctx: Option<&SpanContext>, msg: &str, attrs: &[(&str, &str)]) {
        self.log(Level::Error, ctx, msg, attrs);
    }

    fn next_span_id(&self) -> String {
        match &self.id_gen {
            Some(generate) => generate(),
            None => id::random_span_id(),
        }
    }

    fn log(&self, level: Level, ctx: Option<&SpanContext>, msg: &str, attrs: &[(&str, &str)]) {
        if level < self.min_level {
            return;
        }

        let time = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let line = match self.format {
            Format::Text => format_text(&time, level, msg, attrs, ctx),
            Format::Json => format_json(&time, level, msg, attrs, ctx),
        };

        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{line}");
        let _ = sink.flush();
    }
}

/// Completion handle for one span. Logs the completion marker exactly
/// once, on [`finish`](SpanGuard::finish) or on drop.
pub struct SpanGuard<'a> {
    logger: &'a Logger,
    ctx: SpanContext,
    name: String,
    started: Instant,
    finished: bool,
}

impl SpanGuard<'_> {
    pub fn context(&self) -> &SpanContext {
        &self.ctx
    }

    pub fn finish(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let duration = format_duration(self.started.elapsed());
        self.logger.log(
            Level::Info,
            Some(&self.ctx),
            &format!("{} completed", self.name),
            &[("duration", &duration)],
        );
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        self.complete();
    }
}

fn format_text(
    time: &str,
    level: Level,
    msg: &str,
    attrs: &[(&str, &str)],
    ctx: Option<&SpanContext>,
) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "time={time} level={} msg={}",
        level.as_str(),
        text_value(msg)
    );
    for (key, value) in attrs {
        let _ = write!(line, " {key}={}", text_value(value));
    }
    if let Some(ctx) = ctx {
        let _ = write!(line, " span={}", text_value(ctx.span_id()));
        if !ctx.parent_id().is_empty() {
            let _ = write!(line, " parent={}", text_value(ctx.parent_id()));
        }
    }
    line
}

fn format_json(
    time: &str,
    level: Level,
    msg: &str,
    attrs: &[(&str, &str)],
    ctx: Option<&SpanContext>,
) -> String {
    let mut object = serde_json::Map::new();
    let mut put = |k: &str, v: &str| {
        object.insert(k.to_owned(), serde_json::Value::String(v.to_owned()));
    };

    put("time", time);
    put("level", level.as_str());
    put("msg", msg);
    for (key, value) in attrs {
        put(key, value);
    }
    if let Some(ctx) = ctx {
        put("span", ctx.span_id());
        if !ctx.parent_id().is_empty() {
            put("parent", ctx.parent_id());
        }
    }

    serde_json::Value::Object(object).to_string()
}

/// Quote and escape a text-format value when needed, mirroring the
/// viewer's tokenizer rules so lines round-trip.
fn text_value(v: &str) -> String {
    if !needs_quoting(v) {
        return v.to_owned();
    }

    let mut out = String::with_capacity(v.len() + 2);
    out.push('"');
    for c in v.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn needs_quoting(v: &str) -> bool {
    v.is_empty() || v.chars().any(|c| c == ' ' || c == '"' || c == '=' || c.is_control())
}

/// Humanize a duration: whole microseconds under 1ms, whole milliseconds
/// under 1s, seconds rounded to 10ms above.
fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000_000 {
        return format!("{}µs", (nanos + 500) / 1_000);
    }
    if nanos < 1_000_000_000 {
        let millis = (nanos + 500_000) / 1_000_000;
        if millis < 1_000 {
            return format!("{millis}ms");
        }
        // 999.5ms..1s rounds up past the branch cutoff
        return "1s".to_owned();
    }

    let millis = (nanos + 5_000_000) / 10_000_000 * 10;
    let secs = millis / 1_000;
    let frac = millis % 1_000;
    if frac == 0 {
        return format!("{secs}s");
    }
    let mut frac = format!("{frac:03}");
    while frac.ends_with('0') {
        frac.pop();
    }
    format!("{secs}.{frac}s")
}
