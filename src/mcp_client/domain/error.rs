//! Error types for MCP client domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing MCP client domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// The server name is empty.
    #[error("MCP server name must not be empty")]
    EmptyServerName,

    /// A tool definition name is empty.
    #[error("tool name must not be empty")]
    EmptyToolName,
}

/// Error returned while parsing a connection state kind from its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown MCP connection state: {0}")]
pub struct ParseConnectionStateKindError(pub String);
