//! Orchestration services for MCP sessions, tool invocation, and refresh.

mod client;
mod deadline;
mod error;
mod invocation;
mod refresh;
mod session_registry;

pub use client::McpClientService;
pub use error::{ConnectionError, ListingError, ToolInvocationError};
pub use invocation::ToolInvocationService;
pub use refresh::ToolRefreshService;
pub use session_registry::{SessionHandle, SessionRegistry};
