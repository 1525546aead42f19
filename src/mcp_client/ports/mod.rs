//! Port contracts for the MCP transport collaborator.

mod session;

pub use session::{McpConnector, McpSession, McpTransportError, McpTransportResult};

#[cfg(test)]
pub use session::{MockMcpConnector, MockMcpSession};
