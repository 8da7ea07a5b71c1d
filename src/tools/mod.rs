//! Tools the model may call mid-response.
//!
//! Each tool provides:
//! - a descriptor (name, description, input schema) advertised to the model
//! - a typed input parsed from the model's JSON arguments
//! - a typed output serialized back as the tool result

pub mod registry;
pub mod search_doc;

pub use registry::{Tool, ToolDescriptor, ToolError, ToolRegistry};
pub use search_doc::{SearchDocIpb, SearchDocRequest, SearchDocResponse};
