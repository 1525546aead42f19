//! Unit tests for the client facade.

use std::sync::Arc;

use crate::mcp_client::{
    adapters::memory::InMemoryMcpConnector,
    config::McpClientConfig,
    domain::{ConnectionStateKind, McpServerName, McpToolDefinition, ToolContent, ToolResult},
    services::McpClientService,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio_util::sync::CancellationToken;

type TestClient = McpClientService<InMemoryMcpConnector, DefaultClock>;

fn server(name: &str) -> McpServerName {
    McpServerName::new(name).expect("valid server name")
}

#[fixture]
fn connector() -> Arc<InMemoryMcpConnector> {
    let connector = Arc::new(InMemoryMcpConnector::new());
    let tool = McpToolDefinition::new("echo", json!({"type": "object"}))
        .expect("valid tool")
        .with_description("Echoes its input");
    connector
        .set_tool_catalog(&server("echo"), vec![tool])
        .expect("catalog is scripted");
    connector
        .set_tool_response(&server("echo"), "echo", vec![ToolContent::text("hello")])
        .expect("response is scripted");
    connector
}

fn build_client(connector: &Arc<InMemoryMcpConnector>) -> TestClient {
    McpClientService::new(
        Arc::clone(connector),
        Arc::new(DefaultClock),
        McpClientConfig::default(),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connect_establishes_a_session_and_lists_tools(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);
    let cancel = CancellationToken::new();

    let handle = client
        .connect(&cancel, &server("echo"))
        .await
        .expect("connect succeeds");

    let state = client.connection_state(&server("echo"));
    assert_eq!(state.session(), Some(handle.id()));
    assert_eq!(state.counts().tools, 1);
    let listed = client.list_all_tools_by_server();
    let [(name, tools)] = listed.as_slice() else {
        panic!("expected one server, got {listed:?}");
    };
    assert_eq!(name, &server("echo"));
    assert_eq!(
        tools.first().and_then(McpToolDefinition::description),
        Some("Echoes its input")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invoke_tool_connects_lazily(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);

    let result = client
        .invoke_tool(&CancellationToken::new(), &server("echo"), "echo", "{}")
        .await
        .expect("invocation succeeds");

    assert_eq!(result, ToolResult::text("hello"));
    assert_eq!(connector.connect_count(&server("echo")), 1);
    assert!(
        client.list_all_tools_by_server().is_empty(),
        "invocation does not refresh the catalog"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribers_observe_state_changes(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);
    let mut events = client.subscribe();

    client
        .connect(&CancellationToken::new(), &server("echo"))
        .await
        .expect("connect succeeds");

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.state.kind());
    }
    assert_eq!(
        kinds,
        [
            ConnectionStateKind::Connecting,
            ConnectionStateKind::Connected,
            ConnectionStateKind::Connected,
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connection_states_lists_every_recorded_server(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);
    connector
        .fail_connect(&server("broken"), Some("refused"))
        .expect("failure is scripted");
    let cancel = CancellationToken::new();

    client
        .connect(&cancel, &server("echo"))
        .await
        .expect("connect succeeds");
    client
        .connect(&cancel, &server("broken"))
        .await
        .expect_err("connect fails");

    let states: Vec<_> = client
        .connection_states()
        .into_iter()
        .map(|(name, state)| (name.as_str().to_owned(), state.kind()))
        .collect();
    assert_eq!(
        states,
        vec![
            ("broken".to_owned(), ConnectionStateKind::Error),
            ("echo".to_owned(), ConnectionStateKind::Connected),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn close_all_disconnects_and_keeps_counts(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);
    let cancel = CancellationToken::new();
    client
        .connect(&cancel, &server("echo"))
        .await
        .expect("connect succeeds");

    client.close_all().await;

    let state = client.connection_state(&server("echo"));
    assert_eq!(state.kind(), ConnectionStateKind::Disconnected);
    assert_eq!(state.counts().tools, 1);
    assert!(!client.close(&server("echo")).await);

    client.refresh_all(&cancel).await;
    assert_eq!(
        client.connection_state(&server("echo")).kind(),
        ConnectionStateKind::Disconnected
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_tools_picks_up_catalog_changes(connector: Arc<InMemoryMcpConnector>) {
    let client = build_client(&connector);
    let cancel = CancellationToken::new();
    client
        .connect(&cancel, &server("echo"))
        .await
        .expect("connect succeeds");
    let tools = ["echo", "reverse"]
        .into_iter()
        .map(|name| McpToolDefinition::new(name, json!({})).expect("valid tool"))
        .collect();
    connector
        .set_tool_catalog(&server("echo"), tools)
        .expect("catalog is scripted");

    client.refresh_tools(&cancel, &server("echo")).await;

    assert_eq!(client.connection_state(&server("echo")).counts().tools, 2);
}
