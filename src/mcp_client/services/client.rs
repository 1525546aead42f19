//! Caller-facing MCP client facade.

use super::{
    ConnectionError, SessionHandle, SessionRegistry, ToolInvocationError, ToolInvocationService,
    ToolRefreshService,
};
use crate::mcp_client::{
    config::McpClientConfig,
    domain::{ConnectionState, McpServerName, McpToolDefinition, ToolResult},
    ports::McpConnector,
    stores::{ConnectionStateEvent, ConnectionStateStore, ToolCatalog},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Wires the stores and services behind one handle.
///
/// All stores are created here and shared between the services, so every
/// operation observes the same session, catalog, and state records.
pub struct McpClientService<K, C>
where
    K: McpConnector,
    C: Clock + Send + Sync,
{
    sessions: Arc<SessionRegistry<K, C>>,
    catalog: Arc<ToolCatalog>,
    states: Arc<ConnectionStateStore>,
    invocation: ToolInvocationService<K, C>,
    refresh: ToolRefreshService<K, C>,
}

impl<K, C> McpClientService<K, C>
where
    K: McpConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a client over `connector`.
    #[must_use]
    pub fn new(connector: Arc<K>, clock: Arc<C>, config: McpClientConfig) -> Self {
        let states = Arc::new(ConnectionStateStore::new(config.event_capacity()));
        let catalog = Arc::new(ToolCatalog::new());
        let sessions = Arc::new(SessionRegistry::new(
            connector,
            Arc::clone(&states),
            Arc::clone(&clock),
            config,
        ));
        let invocation = ToolInvocationService::new(Arc::clone(&sessions), config);
        let refresh = ToolRefreshService::new(
            Arc::clone(&sessions),
            Arc::clone(&catalog),
            Arc::clone(&states),
            clock,
            config,
        );
        Self {
            sessions,
            catalog,
            states,
            invocation,
            refresh,
        }
    }

    /// Establishes a session with `server` if needed and refreshes its
    /// tools.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] when no session can be obtained. Listing
    /// failures are recorded in the server's state instead.
    pub async fn connect(
        &self,
        cancel: &CancellationToken,
        server: &McpServerName,
    ) -> Result<SessionHandle, ConnectionError> {
        let handle = self.sessions.get_or_renew(cancel, server).await?;
        self.refresh.refresh_tools(cancel, server).await;
        Ok(handle)
    }

    /// Returns a snapshot of every server's tools, sorted by server name.
    #[must_use]
    pub fn list_all_tools_by_server(&self) -> Vec<(McpServerName, Arc<[McpToolDefinition]>)> {
        self.catalog.all().collect()
    }

    /// Invokes `tool` on `server` with JSON object `arguments`.
    ///
    /// # Errors
    ///
    /// See [`ToolInvocationService::run_tool`].
    pub async fn invoke_tool(
        &self,
        cancel: &CancellationToken,
        server: &McpServerName,
        tool: &str,
        arguments: &str,
    ) -> Result<ToolResult, ToolInvocationError> {
        self.invocation
            .run_tool(cancel, server, tool, arguments)
            .await
    }

    /// Re-lists the tools of `server`. Failures are recorded, not returned.
    pub async fn refresh_tools(&self, cancel: &CancellationToken, server: &McpServerName) {
        self.refresh.refresh_tools(cancel, server).await;
    }

    /// Re-lists the tools of every tracked server.
    pub async fn refresh_all(&self, cancel: &CancellationToken) {
        self.refresh.refresh_all(cancel).await;
    }

    /// Returns the recorded state of `server`.
    #[must_use]
    pub fn connection_state(&self, server: &McpServerName) -> ConnectionState {
        self.states.get(server)
    }

    /// Returns every recorded state, sorted by server name.
    #[must_use]
    pub fn connection_states(&self) -> Vec<(McpServerName, ConnectionState)> {
        self.states.snapshot()
    }

    /// Subscribes to connection state changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionStateEvent> {
        self.states.subscribe()
    }

    /// Closes the session with `server`. Returns `false` when none was
    /// tracked.
    pub async fn close(&self, server: &McpServerName) -> bool {
        self.sessions.close(server).await
    }

    /// Closes every tracked session.
    pub async fn close_all(&self) {
        self.sessions.close_all().await;
    }
}
