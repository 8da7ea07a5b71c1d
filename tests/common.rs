//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use ipb_chat_server::catalog::Catalog;
use ipb_chat_server::llm::{
    LlmError, ModelClient, ModelEvent, ModelRequest, ModelResponse, ModelStream, ToolCall,
};
use ipb_chat_server::AppState;
use serde_json::json;

/// Model double that always gives the same reply.
pub enum MockModel {
    Text(String),
    SearchDoc(String),
    Fails { status: u16, message: String },
    /// Streams `TextDelta`s and then breaks with a transport-level parse error.
    BreaksMidStream(Vec<String>),
}

impl MockModel {
    fn tool_call(termo: &str) -> ToolCall {
        ToolCall {
            name: "searchDocIPB".to_string(),
            arguments: json!({ "termo": termo }),
        }
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(&self, _request: ModelRequest) -> Result<ModelResponse, LlmError> {
        match self {
            MockModel::Text(text) => Ok(ModelResponse {
                text: text.clone(),
                ..Default::default()
            }),
            MockModel::SearchDoc(termo) => Ok(ModelResponse {
                tool_calls: vec![Self::tool_call(termo)],
                ..Default::default()
            }),
            MockModel::Fails { status, message } => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
            MockModel::BreaksMidStream(parts) => Ok(ModelResponse {
                text: parts.concat(),
                ..Default::default()
            }),
        }
    }

    async fn generate_stream(&self, request: ModelRequest) -> Result<ModelStream, LlmError> {
        let events: Vec<Result<ModelEvent, LlmError>> = match self {
            MockModel::Text(text) => vec![
                Ok(ModelEvent::TextDelta(text.clone())),
                Ok(ModelEvent::Finished {
                    reason: Some("STOP".to_string()),
                }),
            ],
            MockModel::SearchDoc(termo) => vec![Ok(ModelEvent::ToolCall(Self::tool_call(termo)))],
            MockModel::Fails { .. } => {
                return Err(self.generate(request).await.unwrap_err());
            }
            MockModel::BreaksMidStream(parts) => {
                let mut events: Vec<_> = parts
                    .iter()
                    .map(|p| Ok(ModelEvent::TextDelta(p.clone())))
                    .collect();
                events.push(Err(LlmError::Parse("unexpected end of stream".to_string())));
                events
            }
        };
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

pub fn app_state(model: MockModel) -> AppState {
    AppState::new(
        Arc::new(Catalog::default_ipb()),
        Arc::new(model),
        "gemini-test",
    )
}
