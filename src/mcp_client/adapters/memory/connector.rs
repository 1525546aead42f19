//! In-memory MCP connector for tests and deterministic local flows.

use crate::mcp_client::{
    domain::{McpServerName, McpToolDefinition, ToolCallRequest, ToolContent},
    ports::{McpConnector, McpSession, McpTransportError, McpTransportResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

/// In-memory MCP connector.
///
/// Each registered server has a script: its tool catalog, canned call
/// responses, and optional failures for connect, ping, listing, and calls.
/// Sessions read the script live, so a test can break a server after a
/// session was handed out.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMcpConnector {
    state: Arc<RwLock<InMemoryConnectorState>>,
}

#[derive(Debug, Default)]
struct InMemoryConnectorState {
    servers: HashMap<McpServerName, ServerScript>,
}

#[derive(Debug, Default)]
struct ServerScript {
    tools: Vec<McpToolDefinition>,
    responses: HashMap<String, Vec<ToolContent>>,
    connect_failure: Option<String>,
    list_failure: Option<String>,
    call_failure: Option<McpTransportError>,
    ping_failure: bool,
    connect_delay: Option<Duration>,
    connects: usize,
    closed_sessions: usize,
    calls: Vec<ToolCallRequest>,
}

fn lock_error(err: impl std::fmt::Display) -> McpTransportError {
    McpTransportError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemoryMcpConnector {
    /// Creates a connector with no servers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> McpTransportResult<RwLockWriteGuard<'_, InMemoryConnectorState>> {
        self.state.write().map_err(lock_error)
    }

    fn update_script(
        &self,
        server: &McpServerName,
        apply: impl FnOnce(&mut ServerScript),
    ) -> McpTransportResult<()> {
        let mut state = self.write()?;
        apply(state.servers.entry(server.clone()).or_default());
        Ok(())
    }

    fn inspect<T>(&self, server: &McpServerName, read: impl FnOnce(&ServerScript) -> T) -> Option<T> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .servers
            .get(server)
            .map(read)
    }

    /// Registers a server so connections to it succeed.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn add_server(&self, server: &McpServerName) -> McpTransportResult<()> {
        self.update_script(server, |_| ())
    }

    /// Replaces the tool catalog of a server, registering it if needed.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_tool_catalog(
        &self,
        server: &McpServerName,
        tools: Vec<McpToolDefinition>,
    ) -> McpTransportResult<()> {
        self.update_script(server, |script| script.tools = tools)
    }

    /// Sets the content parts returned when `tool` is called on `server`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_tool_response(
        &self,
        server: &McpServerName,
        tool: impl Into<String>,
        parts: Vec<ToolContent>,
    ) -> McpTransportResult<()> {
        let tool_name = tool.into();
        self.update_script(server, |script| {
            script.responses.insert(tool_name, parts);
        })
    }

    /// Makes connection attempts to `server` fail with `message`, or succeed
    /// again when `None`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_connect(
        &self,
        server: &McpServerName,
        message: Option<&str>,
    ) -> McpTransportResult<()> {
        let failure = message.map(str::to_owned);
        self.update_script(server, |script| script.connect_failure = failure)
    }

    /// Makes tool listing on `server` fail with `message`, or succeed again
    /// when `None`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_listing(
        &self,
        server: &McpServerName,
        message: Option<&str>,
    ) -> McpTransportResult<()> {
        let failure = message.map(str::to_owned);
        self.update_script(server, |script| script.list_failure = failure)
    }

    /// Makes tool calls on `server` fail with `error`, or succeed again when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_calls(
        &self,
        server: &McpServerName,
        error: Option<McpTransportError>,
    ) -> McpTransportResult<()> {
        self.update_script(server, |script| script.call_failure = error)
    }

    /// Makes liveness pings on `server` fail.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn fail_pings(&self, server: &McpServerName, failing: bool) -> McpTransportResult<()> {
        self.update_script(server, |script| script.ping_failure = failing)
    }

    /// Delays connection attempts to `server` by `delay`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_connect_delay(
        &self,
        server: &McpServerName,
        delay: Option<Duration>,
    ) -> McpTransportResult<()> {
        self.update_script(server, |script| script.connect_delay = delay)
    }

    /// Returns how many connection attempts reached `server`.
    #[must_use]
    pub fn connect_count(&self, server: &McpServerName) -> usize {
        self.inspect(server, |script| script.connects)
            .unwrap_or_default()
    }

    /// Returns how many sessions to `server` were closed.
    #[must_use]
    pub fn closed_sessions(&self, server: &McpServerName) -> usize {
        self.inspect(server, |script| script.closed_sessions)
            .unwrap_or_default()
    }

    /// Returns every call request received by `server`, oldest first.
    #[must_use]
    pub fn recorded_calls(&self, server: &McpServerName) -> Vec<ToolCallRequest> {
        self.inspect(server, |script| script.calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl McpConnector for InMemoryMcpConnector {
    async fn connect(&self, server: &McpServerName) -> McpTransportResult<Arc<dyn McpSession>> {
        let delay = self
            .inspect(server, |script| script.connect_delay)
            .flatten();
        if let Some(wait) = delay {
            tokio::time::sleep(wait).await;
        }

        let mut state = self.write()?;
        let script = state.servers.get_mut(server).ok_or_else(|| {
            McpTransportError::runtime(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("unknown MCP server '{server}'"),
            ))
        })?;
        script.connects += 1;

        if let Some(message) = &script.connect_failure {
            return Err(McpTransportError::runtime(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message.clone(),
            )));
        }

        Ok(Arc::new(InMemoryMcpSession {
            server: server.clone(),
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Session handed out by [`InMemoryMcpConnector`].
#[derive(Debug)]
pub struct InMemoryMcpSession {
    server: McpServerName,
    state: Arc<RwLock<InMemoryConnectorState>>,
    closed: AtomicBool,
}

impl InMemoryMcpSession {
    /// Returns `true` once the session was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> McpTransportResult<()> {
        if self.is_closed() {
            return Err(McpTransportError::Closed);
        }
        Ok(())
    }

    fn with_script<T>(
        &self,
        apply: impl FnOnce(&mut ServerScript) -> McpTransportResult<T>,
    ) -> McpTransportResult<T> {
        let mut state = self.state.write().map_err(lock_error)?;
        let script = state
            .servers
            .get_mut(&self.server)
            .ok_or(McpTransportError::Closed)?;
        apply(script)
    }
}

#[async_trait]
impl McpSession for InMemoryMcpSession {
    async fn list_tools(&self) -> McpTransportResult<Vec<McpToolDefinition>> {
        self.ensure_open()?;
        self.with_script(|script| match &script.list_failure {
            Some(message) => Err(McpTransportError::protocol(message.clone())),
            None => Ok(script.tools.clone()),
        })
    }

    async fn call_tool(&self, request: &ToolCallRequest) -> McpTransportResult<Vec<ToolContent>> {
        self.ensure_open()?;
        self.with_script(|script| {
            script.calls.push(request.clone());
            if let Some(error) = &script.call_failure {
                return Err(error.clone());
            }
            script
                .responses
                .get(&request.name)
                .cloned()
                .ok_or_else(|| McpTransportError::protocol(format!("unknown tool: {}", request.name)))
        })
    }

    async fn ping(&self) -> McpTransportResult<()> {
        self.ensure_open()?;
        self.with_script(|script| {
            if script.ping_failure {
                return Err(McpTransportError::runtime(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "ping failed",
                )));
            }
            Ok(())
        })
    }

    async fn close(&self) -> McpTransportResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.with_script(|script| {
            script.closed_sessions += 1;
            Ok(())
        })
    }
}
