use std::convert::Infallible;

use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::ChatError;
use super::models::{ChatRequest, ChatResponse};
use crate::tools::{SearchDocRequest, ToolDescriptor, ToolError};
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant answer", body = ChatResponse),
        (status = 400, description = "Malformed message list", body = ErrorResponse),
        (status = 502, description = "Model request failed", body = ErrorResponse)
    )
)]
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    log::info!(
        "[{}] chat request with {} messages",
        request_id,
        body.messages.len()
    );

    match state.chat.answer(body.into_inner()).await {
        Ok(response) => {
            log::info!("[{}] answered ({} chars)", request_id, response.content.len());
            Ok(HttpResponse::Ok().json(response))
        }
        Err(err) => {
            log::error!("[{}] chat request failed: {}", request_id, err);
            Err(err)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/chat/stream",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer as text/event-stream (text, tool_call, tool_result, error, done events)"),
        (status = 400, description = "Malformed message list", body = ErrorResponse),
        (status = 502, description = "Model request failed", body = ErrorResponse)
    )
)]
pub async fn chat_stream(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    log::info!(
        "[{}] streaming chat request with {} messages",
        request_id,
        body.messages.len()
    );

    let chunks = state.chat.answer_stream(body.into_inner()).await.map_err(|err| {
        log::error!("[{}] streaming chat request failed: {}", request_id, err);
        err
    })?;

    let events = chunks.map(|chunk| Ok::<_, Infallible>(web::Bytes::from(chunk.to_sse())));

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(events))
}

#[utoipa::path(
    get,
    path = "/api/tools",
    tag = "Tools",
    responses(
        (status = 200, description = "Tools offered to the model", body = [ToolDescriptor])
    )
)]
pub async fn list_tools(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.chat.registry().list_tools())
}

#[utoipa::path(
    post,
    path = "/api/tools/{name}",
    tag = "Tools",
    params(
        ("name" = String, Path, description = "Tool name, e.g. searchDocIPB")
    ),
    request_body(content = SearchDocRequest, description = "Tool arguments; searchDocIPB takes { \"termo\": string }"),
    responses(
        (status = 200, description = "Tool output"),
        (status = 400, description = "Invalid tool arguments", body = ErrorResponse),
        (status = 404, description = "Unknown tool", body = ErrorResponse)
    )
)]
pub async fn call_tool(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let name = path.into_inner();

    let arguments = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(err) => {
                return HttpResponse::BadRequest()
                    .json(ErrorResponse::bad_request(&format!("Invalid JSON: {}", err)))
            }
        }
    };

    match state.chat.registry().call_tool(&name, arguments) {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(err @ ToolError::UnknownTool { .. }) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
        }
        Err(err @ ToolError::InvalidArguments { .. }) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
        Err(err) => {
            log::error!("tool {} failed: {}", name, err);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&err.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model": state.chat.model_id(),
        "documents": state.catalog.len(),
    }))
}

/// Routes mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat)))
        .service(web::resource("/chat/stream").route(web::post().to(chat_stream)))
        .service(web::resource("/tools").route(web::get().to(list_tools)))
        .service(web::resource("/tools/{name}").route(web::post().to(call_tool)));
}
