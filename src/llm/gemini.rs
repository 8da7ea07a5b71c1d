//! Gemini (Google Generative Language API) client.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::sse::SseDecoder;
use super::{
    LlmError, ModelClient, ModelEvent, ModelRequest, ModelResponse, ModelStream, ToolCall,
    ToolChoice,
};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        // Only `generate` gets a whole-request deadline; a stream is bounded per read.
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent(concat!("ipb-chat-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, method)
    }

    async fn post(
        &self,
        url: &str,
        body: &Value,
        deadline: Option<Duration>,
    ) -> Result<reqwest::Response, LlmError> {
        let mut builder = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }

        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status,
                message: extract_error_message(&text),
            });
        }

        Ok(resp)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, LlmError> {
        let url = self.endpoint(&request.model, "generateContent");
        let body = build_request_body(&request);
        log::debug!("POST {} ({} tools)", url, request.tools.len());

        let resp = self.post(&url, &body, Some(self.config.timeout)).await?;
        let raw: Value = resp.json().await?;
        parse_response(raw)
    }

    async fn generate_stream(&self, request: ModelRequest) -> Result<ModelStream, LlmError> {
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&request.model, "streamGenerateContent")
        );
        let body = build_request_body(&request);
        log::debug!("POST {} ({} tools)", url, request.tools.len());

        let resp = self.post(&url, &body, None).await?;

        let body = Box::pin(resp.bytes_stream());
        let events = futures::stream::unfold(
            (body, SseDecoder::new(), false),
            |(mut body, mut decoder, done)| async move {
                if done {
                    return None;
                }
                match body.next().await {
                    Some(Ok(bytes)) => {
                        let events: Vec<_> = decoder
                            .push(&bytes)
                            .iter()
                            .flat_map(|data| parse_stream_data(data))
                            .collect();
                        Some((events, (body, decoder, false)))
                    }
                    Some(Err(err)) => Some((vec![Err(LlmError::Http(err))], (body, decoder, true))),
                    None => {
                        let events = decoder
                            .finish()
                            .map(|data| parse_stream_data(&data))
                            .unwrap_or_default();
                        Some((events, (body, decoder, true)))
                    }
                }
            },
        )
        .flat_map(futures::stream::iter);

        Ok(Box::pin(events))
    }
}

/// JSON body shared by `generateContent` and `streamGenerateContent`.
pub fn build_request_body(request: &ModelRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    });

    if !request.system.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": request.system }] });
    }

    if !request.tools.is_empty() {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                })
            })
            .collect();

        let mode = match request.tool_choice {
            ToolChoice::Auto => "AUTO",
            ToolChoice::None => "NONE",
        };

        body["tools"] = json!([{ "functionDeclarations": declarations }]);
        body["toolConfig"] = json!({ "functionCallingConfig": { "mode": mode } });
    }

    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl GenerateContentResponse {
    fn into_parts(self) -> (Vec<Part>, Option<String>, Option<String>) {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        match self.candidates.into_iter().next() {
            Some(candidate) => (
                candidate.content.map(|c| c.parts).unwrap_or_default(),
                candidate.finish_reason,
                block_reason,
            ),
            None => (Vec::new(), None, block_reason),
        }
    }
}

/// Parse a complete `generateContent` reply.
pub fn parse_response(raw: Value) -> Result<ModelResponse, LlmError> {
    let parsed: GenerateContentResponse =
        serde_json::from_value(raw).map_err(|e| LlmError::Parse(e.to_string()))?;
    let (parts, finish_reason, block_reason) = parsed.into_parts();

    if parts.is_empty() {
        if let Some(reason) = block_reason {
            return Err(LlmError::Api {
                status: 200,
                message: format!("prompt blocked: {}", reason),
            });
        }
    }

    let mut response = ModelResponse {
        finish_reason,
        ..Default::default()
    };

    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = part.text {
            response.text.push_str(&text);
        }
        if let Some(call) = part.function_call {
            response.tool_calls.push(ToolCall {
                name: call.name,
                arguments: call.args,
            });
        }
    }

    Ok(response)
}

/// Turn one SSE `data` payload from `streamGenerateContent` into events.
pub fn parse_stream_data(data: &str) -> Vec<Result<ModelEvent, LlmError>> {
    let parsed: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(parsed) => parsed,
        Err(e) => return vec![Err(LlmError::Parse(e.to_string()))],
    };
    let (parts, finish_reason, _) = parsed.into_parts();

    let mut events = Vec::new();
    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = part.text.filter(|t| !t.is_empty()) {
            events.push(Ok(ModelEvent::TextDelta(text)));
        }
        if let Some(call) = part.function_call {
            events.push(Ok(ModelEvent::ToolCall(ToolCall {
                name: call.name,
                arguments: call.args,
            })));
        }
    }

    if finish_reason.is_some() {
        events.push(Ok(ModelEvent::Finished {
            reason: finish_reason,
        }));
    }

    events
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
