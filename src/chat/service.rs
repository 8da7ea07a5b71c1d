//! Chat service - bridges one conversational turn to the model.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::errors::ChatError;
use super::models::{ChatRequest, ChatResponse, ResponseChunk, Role};
use crate::llm::{ModelClient, ModelEvent, ModelRequest, ModelStream, ToolCall, ToolChoice};
use crate::tools::ToolRegistry;

/// Instruction sent with every request. Restricts tool use to explicit
/// requests for official IPB documents.
pub const SYSTEM_PROMPT: &str = "\
Você é um especialista na Igreja Presbiteriana do Brasil.
Sempre que o usuário fizer uma pergunta que exija uma busca em documentos ou sites da IPB, utilize a ferramenta searchDocIPB.
Use a ferramenta searchDocIPB apenas quando o usuário pedir um documento específico da IPB, como a constituição, catecismos, código de disciplina, manuais ou confissões.
Se a pergunta for sobre igrejas locais, endereços, história da igreja ou dados gerais, **não use nenhuma ferramenta**.";

const STREAM_BUFFER: usize = 32;

pub type ChunkStream = Pin<Box<dyn Stream<Item = ResponseChunk> + Send>>;

#[derive(Clone)]
pub struct ChatService {
    model: Arc<dyn ModelClient>,
    registry: Arc<ToolRegistry>,
    model_id: String,
}

impl ChatService {
    pub fn new(
        model: Arc<dyn ModelClient>,
        registry: Arc<ToolRegistry>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            model,
            registry,
            model_id: model_id.into(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Single-shot answer: waits for the model, then returns the first tool
    /// result if a tool ran, otherwise the model's text.
    pub async fn answer(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let model_request = self.prepare(&request)?;
        let response = self.model.generate(model_request).await?;

        let mut tool_content = None;
        for call in &response.tool_calls {
            let resultado = self.run_tool(call)?;
            tool_content.get_or_insert(resultado);
        }

        Ok(ChatResponse::assistant(select_content(
            tool_content,
            response.text,
        )))
    }

    /// Incremental answer. Upstream failures after the stream has started are
    /// reported as an `error` chunk that ends the stream.
    pub async fn answer_stream(&self, request: ChatRequest) -> Result<ChunkStream, ChatError> {
        let model_request = self.prepare(&request)?;
        let upstream = self.model.generate_stream(model_request).await?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = self.clone();
        tokio::spawn(async move {
            service.forward(upstream, tx).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Shared by both response modes so they apply the same prompt and tool policy.
    fn prepare(&self, request: &ChatRequest) -> Result<ModelRequest, ChatError> {
        if request.messages.is_empty() {
            return Err(ChatError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }

        // Earlier turns are not forwarded.
        let prompt = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .ok_or_else(|| {
                ChatError::InvalidRequest("messages must contain a user message".to_string())
            })?;

        if prompt.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "the last user message is empty".to_string(),
            ));
        }

        Ok(ModelRequest {
            model: self.model_id.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            tools: self.registry.list_tools(),
            tool_choice: ToolChoice::Auto,
        })
    }

    fn run_tool(&self, call: &ToolCall) -> Result<String, ChatError> {
        log::info!("model invoked tool {} with {}", call.name, call.arguments);
        let output = self
            .registry
            .call_tool(&call.name, Some(call.arguments.clone()))?;

        Ok(match output.get("resultado").and_then(|v| v.as_str()) {
            Some(resultado) => resultado.to_string(),
            None => output.to_string(),
        })
    }

    async fn forward(&self, mut upstream: ModelStream, tx: mpsc::Sender<ResponseChunk>) {
        let mut text = String::new();
        let mut tool_content: Option<String> = None;

        while let Some(event) = upstream.next().await {
            let chunks = match event {
                Ok(ModelEvent::TextDelta(delta)) => {
                    text.push_str(&delta);
                    vec![ResponseChunk::Text { delta }]
                }
                Ok(ModelEvent::ToolCall(call)) => {
                    let announce = ResponseChunk::ToolCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    };
                    match self.run_tool(&call) {
                        Ok(resultado) => {
                            tool_content.get_or_insert_with(|| resultado.clone());
                            vec![
                                announce,
                                ResponseChunk::ToolResult {
                                    name: call.name,
                                    resultado,
                                },
                            ]
                        }
                        Err(err) => {
                            log::error!("tool call failed mid-stream: {}", err);
                            let failure = ResponseChunk::Error {
                                message: err.to_string(),
                            };
                            send_all(&tx, vec![announce, failure]).await;
                            return;
                        }
                    }
                }
                Ok(ModelEvent::Finished { reason }) => {
                    log::debug!("model stream finished: {:?}", reason);
                    continue;
                }
                Err(err) => {
                    log::error!("model stream failed: {}", err);
                    let failure = ResponseChunk::Error {
                        message: ChatError::from(err).to_string(),
                    };
                    send_all(&tx, vec![failure]).await;
                    return;
                }
            };

            if !send_all(&tx, chunks).await {
                log::debug!("client disconnected, dropping model stream");
                return;
            }
        }

        let content = select_content(tool_content, text);
        send_all(&tx, vec![ResponseChunk::Done { content }]).await;
    }
}

/// A non-empty tool result wins over the model's free text.
pub fn select_content(tool_content: Option<String>, text: String) -> String {
    tool_content.filter(|c| !c.is_empty()).unwrap_or(text)
}

async fn send_all(tx: &mpsc::Sender<ResponseChunk>, chunks: Vec<ResponseChunk>) -> bool {
    for chunk in chunks {
        if tx.send(chunk).await.is_err() {
            return false;
        }
    }
    true
}
