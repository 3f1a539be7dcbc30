//! Types for decoded transcript entries and their content blocks.

use serde_json::{Map, Value};

/// Default used for a missing role or tool name
pub const UNKNOWN: &str = "unknown";

/// Which side of the conversation produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
}

impl EntryKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::User => "user",
            EntryKind::Assistant => "assistant",
        }
    }
}

/// One retained line of the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub message: Message,
}

impl LogEntry {
    /// Keep only `user`/`assistant` objects that carry a `message` field.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(EntryKind::parse)?;
        let message = obj.get("message")?;
        Some(Self {
            kind,
            message: Message::from_value(message),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self {
                role: UNKNOWN.to_string(),
                content: MessageContent::Unsupported,
            };
        };
        let role = obj
            .get("role")
            .and_then(|v| v.as_str())
            .unwrap_or(UNKNOWN)
            .to_string();
        let content = match obj.get("content") {
            None => MessageContent::Text(String::new()),
            Some(Value::String(text)) => MessageContent::Text(text.clone()),
            Some(Value::Array(items)) => MessageContent::Blocks(
                items
                    .iter()
                    .filter_map(|item| item.as_object())
                    .map(ContentBlock::from_map)
                    .collect(),
            ),
            Some(_) => MessageContent::Unsupported,
        };
        Self { role, content }
    }
}

/// `message.content` is either plain text or an ordered list of blocks
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// Any other JSON shape (number, object, null); renders no body
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    Thinking { text: String },
    ToolUse { name: String, input: Value },
    ToolResult { content: ToolResultContent },
    /// Tags this exporter does not know; skipped when rendering
    Unknown { tag: Option<String> },
}

impl ContentBlock {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let tag = match map.get("type") {
            None => "text",
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) => return Self::Unknown { tag: None },
        };
        match tag {
            "text" => Self::Text {
                text: string_field(map, "text"),
            },
            "thinking" => Self::Thinking {
                text: string_field(map, "text"),
            },
            "tool_use" => Self::ToolUse {
                name: map
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or(UNKNOWN)
                    .to_string(),
                input: map
                    .get("input")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            },
            "tool_result" => Self::ToolResult {
                content: match map.get("content") {
                    None => ToolResultContent::Text(String::new()),
                    Some(Value::String(text)) => ToolResultContent::Text(text.clone()),
                    Some(other) => ToolResultContent::Other(other.clone()),
                },
            },
            other => Self::Unknown {
                tag: Some(other.to_string()),
            },
        }
    }
}

/// Tool results are truncated only when they are plain strings
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultContent {
    Text(String),
    Other(Value),
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
