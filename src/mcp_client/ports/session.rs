//! Transport port: session establishment and per-session RPCs.
//!
//! Framing, handshake, and the wire protocol live behind these traits. The
//! core only sequences calls, bounds them with timeouts and cancellation, and
//! interprets their results.

use crate::mcp_client::domain::{McpServerName, McpToolDefinition, ToolCallRequest, ToolContent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type McpTransportResult<T> = Result<T, McpTransportError>;

/// Establishes sessions with MCP servers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// Establishes (or re-establishes) a session with `server`.
    async fn connect(&self, server: &McpServerName) -> McpTransportResult<Arc<dyn McpSession>>;
}

/// An established session with one MCP server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McpSession: Send + Sync {
    /// Lists the tools the server currently exposes.
    async fn list_tools(&self) -> McpTransportResult<Vec<McpToolDefinition>>;

    /// Invokes a tool and returns the response content parts.
    async fn call_tool(&self, request: &ToolCallRequest) -> McpTransportResult<Vec<ToolContent>>;

    /// Checks that the session is still alive.
    async fn ping(&self) -> McpTransportResult<()>;

    /// Closes the session. Further calls may fail.
    async fn close(&self) -> McpTransportResult<()>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum McpTransportError {
    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation did not complete in time.
    #[error("{operation} timed out after {timeout:?}")]
    TimedOut {
        /// Operation name.
        operation: &'static str,
        /// Elapsed bound.
        timeout: Duration,
    },

    /// The server answered with a protocol-level error.
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// The session is closed.
    #[error("MCP session is closed")]
    Closed,

    /// Generic transport failure.
    #[error("MCP transport error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl McpTransportError {
    /// Wraps a runtime error from the transport adapter.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns `true` when the failure suggests the session itself is no
    /// longer usable, as opposed to the server rejecting one request.
    #[must_use]
    pub const fn is_session_fault(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Closed | Self::Runtime(_))
    }
}
