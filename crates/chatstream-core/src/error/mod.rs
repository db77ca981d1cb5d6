//! Error types for chatstream
//!
//! Every failure surfaced by the core is a [`ChatError`]. Each variant maps to
//! one stage of a completion turn and carries enough context to tell the
//! caller which stage failed:
//! - error_code(): stable identifier for programmatic handling
//! - stage(): the pipeline stage that failed
//! - context: optional human-readable context attached by the caller

mod constructors;
mod types;

pub use types::{ChatError, ChatResult, Stage};
