//! Shared fixtures for in-memory MCP client integration tests.

use std::sync::Arc;

use mcp_bridge::mcp_client::{
    adapters::InMemoryMcpConnector,
    config::McpClientConfig,
    domain::{McpServerName, McpToolDefinition},
    services::McpClientService,
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::json;

/// Client over the in-memory connector.
pub type TestClient = McpClientService<InMemoryMcpConnector, DefaultClock>;

/// A client together with the connector scripting its servers.
pub struct TestContext {
    pub connector: Arc<InMemoryMcpConnector>,
    pub client: Arc<TestClient>,
}

/// Provides a client whose connector knows no servers yet.
#[fixture]
pub fn context() -> TestContext {
    let connector = Arc::new(InMemoryMcpConnector::new());
    let client = Arc::new(McpClientService::new(
        Arc::clone(&connector),
        Arc::new(DefaultClock),
        McpClientConfig::default(),
    ));
    TestContext { connector, client }
}

/// Builds a validated server name.
pub fn server(name: &str) -> McpServerName {
    McpServerName::new(name).expect("valid server name")
}

/// Builds a tool definition with an object input schema.
pub fn tool(name: &str) -> McpToolDefinition {
    McpToolDefinition::new(name, json!({"type": "object", "properties": {}}))
        .expect("valid tool definition")
}
