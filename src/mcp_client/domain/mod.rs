//! Domain model for MCP client sessions and tool invocation.
//!
//! The domain covers server identity, per-server connection state, tool
//! descriptors, the content union returned by tool calls, and the normalized
//! [`ToolResult`] handed back to callers. Transport concerns remain outside
//! this boundary.

mod arguments;
mod content;
mod error;
mod ids;
mod result;
mod state;
mod tool;

pub use arguments::{ArgumentParseError, ToolArguments};
pub use content::ToolContent;
pub use error::{ParseConnectionStateKindError, ToolRegistryDomainError};
pub use ids::{McpServerName, McpSessionId};
pub use result::{ToolResult, ToolResultKind};
pub use state::{ConnectionState, ConnectionStateKind, ConnectionStatus, ToolCounts};
pub use tool::{McpToolDefinition, ToolCallRequest};
