use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::llm::LlmError;
use crate::tools::ToolError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),
    #[error("tool call failed: {0}")]
    Tool(#[from] ToolError),
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::Model(_) => StatusCode::BAD_GATEWAY,
            ChatError::Tool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        let body = match self {
            ChatError::InvalidRequest(_) => ErrorResponse::bad_request(&message),
            ChatError::Model(_) => ErrorResponse::bad_gateway(&message),
            ChatError::Tool(_) => ErrorResponse::internal_error(&message),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
