//! Registry of the tools each server currently exposes.

use crate::mcp_client::domain::{McpServerName, McpToolDefinition};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Concurrency-safe map from server name to its ordered tool list.
///
/// Lists are stored as immutable `Arc<[_]>` slices and replaced wholesale, so
/// a reader holding a list sees either the old or the new one, never a mix.
/// A present entry is never empty: an empty listing removes the entry, which
/// keeps "never refreshed" and "explicitly empty" from being confused.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: RwLock<HashMap<McpServerName, Arc<[McpToolDefinition]>>>,
}

impl ToolCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tool list for `server`, removing the entry when `tools`
    /// is empty.
    pub fn update_tools(&self, server: &McpServerName, tools: Vec<McpToolDefinition>) {
        if tools.is_empty() {
            self.delete(server);
            return;
        }
        self.set(server, tools);
    }

    fn set(&self, server: &McpServerName, tools: Vec<McpToolDefinition>) {
        tracing::debug!(server = %server, tools = tools.len(), "tool list replaced");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(server.clone(), Arc::from(tools));
    }

    fn delete(&self, server: &McpServerName) {
        tracing::debug!(server = %server, "tool list removed");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(server);
    }

    /// Returns a snapshot of every `(server, tools)` pair, sorted by server
    /// name.
    pub fn all(&self) -> impl Iterator<Item = (McpServerName, Arc<[McpToolDefinition]>)> + use<> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(server, tools)| (server.clone(), Arc::clone(tools)))
            .collect();
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        entries.into_iter()
    }

    /// Returns the tool list for `server`, if it has any tools.
    #[must_use]
    pub fn tools_for(&self, server: &McpServerName) -> Option<Arc<[McpToolDefinition]>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server)
            .cloned()
    }

    /// Looks up one tool by name on `server`.
    #[must_use]
    pub fn find_tool(&self, server: &McpServerName, tool_name: &str) -> Option<McpToolDefinition> {
        self.tools_for(server)?
            .iter()
            .find(|tool| tool.name() == tool_name)
            .cloned()
    }

    /// Returns the number of servers with at least one tool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no server has tools registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
