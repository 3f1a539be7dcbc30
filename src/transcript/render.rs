//! Plain-text rendering of a single message.

use serde_json::Value;

use super::types::{ContentBlock, Message, MessageContent, ToolResultContent};

/// Tool result strings longer than this many characters are cut
pub const TOOL_RESULT_LIMIT: usize = 2000;
pub const TRUNCATION_MARKER: &str = "\n... (truncated) ...";

/// Truncate a string to max_chars, appending `marker` if truncated
pub fn truncate(input: &str, max_chars: usize, marker: &str) -> String {
    match input.char_indices().nth(max_chars) {
        None => input.to_string(),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + marker.len());
            out.push_str(&input[..cut]);
            out.push_str(marker);
            out
        }
    }
}

fn render_tool_result(content: &ToolResultContent) -> String {
    match content {
        ToolResultContent::Text(text) => truncate(text, TOOL_RESULT_LIMIT, TRUNCATION_MARKER),
        ToolResultContent::Other(value) => value.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render a message as `[ROLE]:` followed by its content, ending in a newline.
///
/// The output starts with a newline so the header lands on its own line when
/// appended directly after a section divider.
pub fn render_message(message: &Message) -> String {
    let mut lines = vec![format!("\n[{}]:", message.role.to_uppercase())];

    match &message.content {
        MessageContent::Text(text) => lines.push(text.clone()),
        MessageContent::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => {
                        if !text.is_empty() {
                            lines.push(text.clone());
                        }
                    }
                    ContentBlock::Thinking { text } => {
                        if !text.is_empty() {
                            lines.push("\n[THINKING]:".to_string());
                            lines.push(text.clone());
                            lines.push("[/THINKING]\n".to_string());
                        }
                    }
                    ContentBlock::ToolUse { name, input } => {
                        lines.push(format!("\n[TOOL: {name}]"));
                        lines.push(pretty_json(input));
                    }
                    ContentBlock::ToolResult { content } => {
                        lines.push("\n[TOOL RESULT]:".to_string());
                        lines.push(render_tool_result(content));
                    }
                    // Newer block types are ignored
                    ContentBlock::Unknown { .. } => {}
                }
            }
        }
        MessageContent::Unsupported => {}
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
