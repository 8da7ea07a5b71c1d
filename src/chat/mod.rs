//! Chat endpoint: one turn in, one answer out (single-shot or streamed).

pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;


pub use errors::ChatError;
pub use models::{ChatMessage, ChatRequest, ChatResponse, ResponseChunk, Role};
pub use service::{ChatService, ChunkStream, SYSTEM_PROMPT};
