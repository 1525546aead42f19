//! MCP client sessions, tool registry, and tool invocation.
//!
//! This module keeps one session per MCP server, mirrors the tools each
//! server exposes, and invokes those tools on behalf of callers. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Shared per-server stores in [`stores`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod stores;

#[cfg(test)]
mod tests;
