//! Offline viewer for logdrill captures.
//!
//! Loads a flat, span-annotated log capture, reconstructs the span
//! hierarchy, and serves it read-only over a small REST API.

// Core engine
pub mod parser;
pub mod query;
pub mod tree;

// Serving layer
pub mod server;
pub mod state;
