//! MCP bridge: client-side session and tool-registry core for MCP servers.
//!
//! This crate keeps per-server connection state, lazily establishes and
//! renews sessions, mirrors the tools each connected server exposes, and
//! invokes those tools, normalizing their heterogeneous output into a single
//! result shape.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the MCP transport
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`mcp_client`]: Sessions, tool registry, invocation, and refresh

pub mod mcp_client;
