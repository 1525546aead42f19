//! Adapter implementations for the MCP transport port.

pub mod memory;

pub use memory::{InMemoryMcpConnector, InMemoryMcpSession};
