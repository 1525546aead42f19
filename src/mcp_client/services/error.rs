//! Service-level errors.

use crate::mcp_client::{
    domain::{ArgumentParseError, McpServerName},
    ports::McpTransportError,
};
use thiserror::Error;

/// Session establishment or renewal failed.
///
/// Recorded as the server's error state and returned to the caller that
/// asked for the session.
#[derive(Debug, Clone, Error)]
#[error("failed to connect to MCP server '{server}': {source}")]
pub struct ConnectionError {
    /// Server the session was requested for.
    pub server: McpServerName,
    /// Underlying transport failure.
    #[source]
    pub source: McpTransportError,
}

impl ConnectionError {
    /// Creates a connection error.
    #[must_use]
    pub const fn new(server: McpServerName, source: McpTransportError) -> Self {
        Self { server, source }
    }

    /// Returns `true` when the wait was cancelled by the caller or by the
    /// caller that initiated a shared renewal.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.source, McpTransportError::Cancelled)
    }
}

/// Listing a server's tools failed during refresh.
///
/// Never returned: it is recorded as the cause of the server's error state.
#[derive(Debug, Clone, Error)]
#[error("failed to list tools for MCP server '{server}': {source}")]
pub struct ListingError {
    /// Server being refreshed.
    pub server: McpServerName,
    /// Underlying transport failure.
    #[source]
    pub source: McpTransportError,
}

/// Errors returned by tool invocation.
#[derive(Debug, Clone, Error)]
pub enum ToolInvocationError {
    /// The argument text was not a JSON object. No network call was made.
    #[error(transparent)]
    ArgumentParse(#[from] ArgumentParseError),

    /// No session could be obtained.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The remote call failed after a session was obtained.
    #[error("MCP tool '{tool}' on server '{server}' failed: {source}")]
    Invocation {
        /// Server the tool lives on.
        server: McpServerName,
        /// Tool name.
        tool: String,
        /// Underlying transport failure.
        #[source]
        source: McpTransportError,
    },
}
