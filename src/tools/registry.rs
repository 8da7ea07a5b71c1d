//! Tool registry - maps tool names to their typed contracts.
//!
//! Provides `list_tools()` for advertising to the model and `call_tool()` for
//! executing a tool from raw JSON arguments.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use super::search_doc::SearchDocIpb;
use crate::catalog::Catalog;

/// Tool descriptor advertised to the model and listed over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    #[schema(value_type = Object)]
    pub input_schema: Value,
}

/// A capability with a strongly typed input and output.
pub trait Tool: Send + Sync + 'static {
    type Input: DeserializeOwned;
    type Output: Serialize;

    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn execute(&self, input: Self::Input) -> Self::Output;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{name}' is not available (available: {available})")]
    UnknownTool { name: String, available: String },
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("failed to serialize result of '{tool}': {source}")]
    Serialize {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Object-safe view of a [`Tool`] working on JSON values.
trait DynTool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;
    fn call(&self, arguments: Option<Value>) -> Result<Value, ToolError>;
}

impl<T: Tool> DynTool for T {
    fn descriptor(&self) -> ToolDescriptor {
        Tool::descriptor(self)
    }

    fn call(&self, arguments: Option<Value>) -> Result<Value, ToolError> {
        let input: T::Input = parse_arguments(arguments).map_err(|message| {
            ToolError::InvalidArguments {
                tool: self.name().to_string(),
                message,
            }
        })?;
        let output = self.execute(input);
        serde_json::to_value(output).map_err(|source| ToolError::Serialize {
            tool: self.name().to_string(),
            source,
        })
    }
}

/// Central registry for the tools offered to the model. Kept in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<(&'static str, Arc<dyn DynTool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry exposing only `searchDocIPB` over the given catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        let mut registry = Self::new();
        registry.register(SearchDocIpb::new(catalog));
        registry
    }

    /// Adds a tool, replacing any previous tool with the same name.
    pub fn register<T: Tool>(&mut self, tool: T) {
        let name = tool.name();
        self.tools.retain(|(existing, _)| *existing != name);
        let tool: Arc<dyn DynTool> = Arc::new(tool);
        self.tools.push((name, tool));
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|(_, tool)| tool.descriptor()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|(existing, _)| *existing == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, tool)| tool)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;

        tool.call(arguments)
    }

    fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|(name, _)| *name).collect()
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, String> {
    let value = arguments.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| err.to_string())
}
