//! Outbound model client.
//!
//! `ModelClient` is the seam between the chat service and the hosted model.
//! `GeminiClient` talks to the Gemini REST API; tests plug in scripted clients.

pub mod gemini;
pub mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolDescriptor;

pub use gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
}

/// Everything needed for one model call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub tools: Vec<ToolDescriptor>,
    pub tool_choice: ToolChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
}

/// One increment of a streamed model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    TextDelta(String),
    ToolCall(ToolCall),
    Finished { reason: Option<String> },
}

pub type ModelStream = Pin<Box<dyn Stream<Item = Result<ModelEvent, LlmError>> + Send>>;

/// Stateless model client - each call is independent.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Waits for the full reply.
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, LlmError>;

    /// Starts a call and yields the reply as it is produced.
    async fn generate_stream(&self, request: ModelRequest) -> Result<ModelStream, LlmError>;
}
