//! MCP tool descriptor and call request value objects.

use super::{ToolArguments, ToolRegistryDomainError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata for a tool exposed by an MCP server.
///
/// Descriptors are passed through verbatim from the transport; the core
/// never interprets the schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpToolDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_schema: Option<Value>,
}

impl McpToolDefinition {
    /// Creates a tool definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyToolName`] when `name` is
    /// empty.
    pub fn new(name: impl Into<String>, input_schema: Value) -> Result<Self, ToolRegistryDomainError> {
        let tool_name = name.into();
        if tool_name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        Ok(Self {
            name: tool_name,
            description: None,
            input_schema,
            output_schema: None,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an optional output schema.
    #[must_use]
    pub fn with_output_schema(mut self, output_schema: Value) -> Self {
        self.output_schema = Some(output_schema);
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description, if the server provided one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Returns the optional output schema.
    #[must_use]
    pub const fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref()
    }
}

/// A request to invoke one tool on a server session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool to invoke.
    pub name: String,
    /// Parsed JSON object arguments.
    pub arguments: ToolArguments,
}

impl ToolCallRequest {
    /// Creates a call request.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
