//! Tool invocation bridge.

use super::{SessionRegistry, ToolInvocationError, deadline::bounded};
use crate::mcp_client::{
    config::McpClientConfig,
    domain::{McpServerName, ToolArguments, ToolCallRequest, ToolResult},
    ports::McpConnector,
};
use mockable::Clock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Invokes tools on MCP servers and normalizes their responses.
#[derive(Clone)]
pub struct ToolInvocationService<K, C>
where
    K: McpConnector,
    C: Clock + Send + Sync,
{
    sessions: Arc<SessionRegistry<K, C>>,
    config: McpClientConfig,
}

impl<K, C> ToolInvocationService<K, C>
where
    K: McpConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an invocation service over `sessions`.
    #[must_use]
    pub const fn new(sessions: Arc<SessionRegistry<K, C>>, config: McpClientConfig) -> Self {
        Self { sessions, config }
    }

    /// Calls `tool` on `server` with the JSON object in `arguments`.
    ///
    /// The arguments are parsed before any session is requested. A response
    /// with no content parts yields an empty text result.
    ///
    /// # Errors
    ///
    /// Returns [`ToolInvocationError::ArgumentParse`] for malformed or
    /// non-object arguments, [`ToolInvocationError::Connection`] when no
    /// session can be obtained, and [`ToolInvocationError::Invocation`] when
    /// the call itself fails.
    pub async fn run_tool(
        &self,
        cancel: &CancellationToken,
        server: &McpServerName,
        tool: &str,
        arguments: &str,
    ) -> Result<ToolResult, ToolInvocationError> {
        let parsed = ToolArguments::parse(arguments)?;
        let handle = self.sessions.get_or_renew(cancel, server).await?;
        let request = ToolCallRequest::new(tool, parsed);

        tracing::debug!(server = %server, tool = %tool, session = %handle.id(), "calling MCP tool");
        let parts = bounded(
            cancel,
            "call_tool",
            self.config.call_timeout(),
            handle.session().call_tool(&request),
        )
        .await
        .map_err(|source| {
            if source.is_session_fault() {
                self.sessions.invalidate(server, handle.id());
            }
            ToolInvocationError::Invocation {
                server: server.clone(),
                tool: request.name.clone(),
                source,
            }
        })?;

        if parts.is_empty() {
            return Ok(ToolResult::empty());
        }
        Ok(ToolResult::from_parts(parts))
    }
}
