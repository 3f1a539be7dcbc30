//! Transcript handling: decoding, types, and rendering.

mod decoder;
mod render;
mod types;

pub use decoder::{Decoder, decode_line};
pub use render::{TOOL_RESULT_LIMIT, TRUNCATION_MARKER, render_message, truncate};
pub use types::{ContentBlock, EntryKind, LogEntry, Message, MessageContent, ToolResultContent};
