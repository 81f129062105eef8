//! Hierarchical logging with flat output.
//!
//! Log lines stay flat and greppable, but carry span metadata (`span`,
//! `parent`) that lets a viewer reconstruct the execution hierarchy
//! afterwards.
//!
//! Correlation state is explicit by design: the caller constructs one
//! [`Logger`] and threads [`SpanContext`] values through the code paths
//! that log. Nothing is stored in thread-locals or process globals.
//!
//! ```no_run
//! use logdrill::Logger;
//!
//! let logger = Logger::text(std::io::stderr());
//!
//! let (ctx, guard) = logger.start(None, "sync-cycle");
//! logger.info(Some(&ctx), "starting device sync", &[]);
//!
//! let (child, child_guard) = logger.start(Some(&ctx), "fetch-agents");
//! logger.debug(Some(&child), "connecting to API", &[]);
//! child_guard.finish();
//!
//! logger.info(Some(&ctx), "sync complete", &[("devices", "3")]);
//! guard.finish();
//! ```

mod context;
mod id;
mod logger;

pub use context::SpanContext;
pub use logger::{IdGenerator, Level, Logger, LoggerOptions, SpanGuard};
