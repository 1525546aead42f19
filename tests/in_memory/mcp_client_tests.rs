//! In-memory integration tests for the MCP client facade.

use std::sync::Arc;
use std::time::Duration;

use mcp_bridge::mcp_client::{
    domain::{ConnectionStateKind, ToolContent, ToolResult, ToolResultKind},
    ports::McpTransportError,
    services::ToolInvocationError,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use super::helpers::{TestContext, context, server, tool};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_connect_invoke_fail_and_recover(context: TestContext) {
    let docs = server("docs");
    context
        .connector
        .set_tool_catalog(&docs, vec![tool("search"), tool("fetch")])
        .expect("catalog is scripted");
    context
        .connector
        .set_tool_response(&docs, "search", vec![ToolContent::text("3 hits")])
        .expect("response is scripted");
    let cancel = CancellationToken::new();

    context
        .client
        .connect(&cancel, &docs)
        .await
        .expect("connect succeeds");
    assert_eq!(context.client.connection_state(&docs).counts().tools, 2);

    let result = context
        .client
        .invoke_tool(&cancel, &docs, "search", r#"{"query": "sessions"}"#)
        .await
        .expect("invocation succeeds");
    assert_eq!(result.kind(), ToolResultKind::Text);
    assert_eq!(result.content(), "3 hits");

    context
        .connector
        .fail_listing(&docs, Some("index rebuilding"))
        .expect("failure is scripted");
    context.client.refresh_tools(&cancel, &docs).await;
    let failed = context.client.connection_state(&docs);
    assert_eq!(failed.kind(), ConnectionStateKind::Error);
    assert_eq!(failed.counts().tools, 0);

    context
        .connector
        .fail_listing(&docs, None)
        .expect("failure is cleared");
    context.client.refresh_tools(&cancel, &docs).await;
    let recovered = context.client.connection_state(&docs);
    assert_eq!(recovered.kind(), ConnectionStateKind::Connected);
    assert_eq!(recovered.counts().tools, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_invocations_share_one_session(context: TestContext) {
    let media = server("media");
    context
        .connector
        .set_tool_response(
            &media,
            "clip",
            vec![
                ToolContent::audio(vec![7_u8, 7], "audio/ogg"),
                ToolContent::text("transcript"),
            ],
        )
        .expect("response is scripted");
    context
        .connector
        .set_connect_delay(&media, Some(Duration::from_millis(50)))
        .expect("delay is set");

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let client = Arc::clone(&context.client);
            let target = media.clone();
            tokio::spawn(async move {
                client
                    .invoke_tool(&CancellationToken::new(), &target, "clip", "{}")
                    .await
            })
        })
        .collect();

    for task in tasks {
        let result = task.await.expect("task joins").expect("invocation succeeds");
        assert_eq!(
            result,
            ToolResult::Media {
                content: "transcript".to_owned(),
                data: vec![7, 7],
                media_type: "audio/ogg".to_owned(),
            }
        );
    }
    assert_eq!(context.connector.connect_count(&media), 1);
    assert_eq!(context.connector.recorded_calls(&media).len(), 6);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_session_is_replaced_transparently(context: TestContext) {
    let shell = server("shell");
    context
        .connector
        .set_tool_response(&shell, "run", vec![ToolContent::text("ok")])
        .expect("response is scripted");
    let cancel = CancellationToken::new();
    let first = context
        .client
        .connect(&cancel, &shell)
        .await
        .expect("connect succeeds");

    context
        .connector
        .fail_calls(&shell, Some(McpTransportError::Closed))
        .expect("failure is scripted");
    let error = context
        .client
        .invoke_tool(&cancel, &shell, "run", "{}")
        .await
        .expect_err("call on a closed session fails");
    assert!(matches!(error, ToolInvocationError::Invocation { .. }));

    context
        .connector
        .fail_calls(&shell, None)
        .expect("failure is cleared");
    context
        .client
        .invoke_tool(&cancel, &shell, "run", "{}")
        .await
        .expect("renewed session answers");

    let state = context.client.connection_state(&shell);
    assert_ne!(state.session(), Some(first.id()));
    assert_eq!(context.connector.closed_sessions(&shell), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn servers_are_tracked_independently(context: TestContext) {
    let healthy = server("healthy");
    let broken = server("broken");
    context
        .connector
        .set_tool_catalog(&healthy, vec![tool("ping")])
        .expect("catalog is scripted");
    context
        .connector
        .fail_connect(&broken, Some("no route to host"))
        .expect("failure is scripted");
    let cancel = CancellationToken::new();

    let (healthy_outcome, broken_outcome) = tokio::join!(
        context.client.connect(&cancel, &healthy),
        context.client.connect(&cancel, &broken),
    );

    assert!(healthy_outcome.is_ok());
    let error = broken_outcome.expect_err("broken server fails");
    assert!(error.to_string().contains("no route to host"));
    let listed: Vec<_> = context
        .client
        .list_all_tools_by_server()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(listed, vec![healthy.clone()]);
    assert_eq!(
        context.client.connection_state(&healthy).kind(),
        ConnectionStateKind::Connected
    );
    assert_eq!(
        context.client.connection_state(&broken).kind(),
        ConnectionStateKind::Error
    );
}
