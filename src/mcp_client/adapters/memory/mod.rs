//! In-memory transport adapter.

mod connector;

pub use connector::{InMemoryMcpConnector, InMemoryMcpSession};
