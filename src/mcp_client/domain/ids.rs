//! Identifier types for MCP servers and sessions.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of a remote tool-providing MCP server.
///
/// The name is opaque: it is kept verbatim and only the empty string is
/// rejected. It is the key for every per-server store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct McpServerName(String);

impl McpServerName {
    /// Creates a server name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyServerName`] when `value` is
    /// empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let name = value.into();
        if name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyServerName);
        }
        Ok(Self(name))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for McpServerName {
    type Error = ToolRegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<McpServerName> for String {
    fn from(value: McpServerName) -> Self {
        value.0
    }
}

impl AsRef<str> for McpServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for McpServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier assigned to an established MCP session.
///
/// A fresh identifier is minted every time a session is (re)established, so
/// two handles with the same identifier refer to the same underlying session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct McpSessionId(Uuid);

impl McpSessionId {
    /// Creates a new random session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for McpSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for McpSessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
