//! Shared, internally synchronized per-server stores.
//!
//! Both stores are owned objects shared by [`std::sync::Arc`]. Every
//! operation is atomic per key; callers never lock anything themselves.

mod connection_state;
mod tool_catalog;

pub use connection_state::{ConnectionStateEvent, ConnectionStateStore};
pub use tool_catalog::ToolCatalog;
