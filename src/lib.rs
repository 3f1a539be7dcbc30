//! Saves a readable copy of a Claude Code conversation before it is compacted.
//!
//! The `precompact` hook reads a request on stdin, renders the JSONL transcript
//! it points at into a plain-text file, and always answers with a JSON response
//! that lets the host continue.

pub mod config;
pub mod error;
pub mod export;
pub mod hook;
pub mod logging;
pub mod setup;
pub mod transcript;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::ExportError;
pub use export::{ExportOutcome, ExportRequest, ExportResult, Exporter, export_transcript};
pub use hook::{HookResponse, run_hook};
pub use logging::{LoggingConfig, init_logging};
