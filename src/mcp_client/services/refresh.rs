//! Tool list refresh orchestration.

use super::{ListingError, SessionRegistry, deadline::bounded};
use crate::mcp_client::{
    config::McpClientConfig,
    domain::{ConnectionState, McpServerName, ToolCounts},
    ports::McpConnector,
    stores::{ConnectionStateStore, ToolCatalog},
};
use futures::future::join_all;
use mockable::Clock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Re-lists a server's tools and records the outcome.
///
/// Failures never propagate to the caller. They are recorded as the server's
/// [`ConnectionState`], which is the only way observers learn about them.
#[derive(Clone)]
pub struct ToolRefreshService<K, C>
where
    K: McpConnector,
    C: Clock + Send + Sync,
{
    sessions: Arc<SessionRegistry<K, C>>,
    catalog: Arc<ToolCatalog>,
    states: Arc<ConnectionStateStore>,
    clock: Arc<C>,
    config: McpClientConfig,
}

impl<K, C> ToolRefreshService<K, C>
where
    K: McpConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a refresh service.
    #[must_use]
    pub const fn new(
        sessions: Arc<SessionRegistry<K, C>>,
        catalog: Arc<ToolCatalog>,
        states: Arc<ConnectionStateStore>,
        clock: Arc<C>,
        config: McpClientConfig,
    ) -> Self {
        Self {
            sessions,
            catalog,
            states,
            clock,
            config,
        }
    }

    /// Lists the tools of `server` over its tracked session.
    ///
    /// Without a tracked session this only logs a warning. A listing failure
    /// records an error state with zeroed counts; success replaces the
    /// server's catalog entry and records a connected state whose tool count
    /// matches the new list.
    pub async fn refresh_tools(&self, cancel: &CancellationToken, server: &McpServerName) {
        let Some(handle) = self.sessions.get(server) else {
            tracing::warn!(server = %server, "no session to refresh tools for MCP server");
            return;
        };

        let listing = bounded(
            cancel,
            "list_tools",
            Some(self.config.list_timeout()),
            handle.session().list_tools(),
        )
        .await;

        match listing {
            Ok(tools) => {
                let mut counts = self.states.get(server).counts();
                counts.tools = tools.len();
                self.catalog.update_tools(server, tools);
                self.states.update(
                    server,
                    ConnectionState::connected(handle.id(), counts, &*self.clock),
                );
            }
            Err(source) => {
                tracing::warn!(server = %server, error = %source, "failed to list MCP tools");
                let cause = ListingError {
                    server: server.clone(),
                    source,
                };
                self.states.update(
                    server,
                    ConnectionState::failed(cause, ToolCounts::default(), &*self.clock),
                );
            }
        }
    }

    /// Refreshes every server with a tracked session concurrently.
    pub async fn refresh_all(&self, cancel: &CancellationToken) {
        let servers = self.sessions.tracked_servers();
        join_all(
            servers
                .iter()
                .map(|server| self.refresh_tools(cancel, server)),
        )
        .await;
    }
}
