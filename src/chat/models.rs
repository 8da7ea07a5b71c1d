use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ChatResponse {
    pub role: Role,
    pub content: String,
}

impl ChatResponse {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One frame of a streamed answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseChunk {
    Text {
        delta: String,
    },
    ToolCall {
        name: String,
        #[schema(value_type = Object)]
        arguments: Value,
    },
    ToolResult {
        name: String,
        resultado: String,
    },
    Error {
        message: String,
    },
    Done {
        content: String,
    },
}

impl ResponseChunk {
    pub fn event_name(&self) -> &'static str {
        match self {
            ResponseChunk::Text { .. } => "text",
            ResponseChunk::ToolCall { .. } => "tool_call",
            ResponseChunk::ToolResult { .. } => "tool_result",
            ResponseChunk::Error { .. } => "error",
            ResponseChunk::Done { .. } => "done",
        }
    }

    /// `text/event-stream` framing: `event: <kind>\ndata: <json>\n\n`.
    pub fn to_sse(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("event: {}\ndata: {}\n\n", self.event_name(), data)
    }
}
