//! Per-server connection state.

use super::{McpSessionId, ParseConnectionStateKindError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Lifecycle tag of a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStateKind {
    /// No session has been established, or it was closed.
    Disconnected,
    /// A session is being established.
    Connecting,
    /// A session is established and usable.
    Connected,
    /// The last connection or listing attempt failed.
    Error,
}

impl ConnectionStateKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStateKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ConnectionStateKind {
    type Error = ParseConnectionStateKindError;

    fn try_from(value: &str) -> Result<Self, ParseConnectionStateKindError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "disconnected" => Ok(Self::Disconnected),
            "connecting" => Ok(Self::Connecting),
            "connected" => Ok(Self::Connected),
            "error" => Ok(Self::Error),
            _ => Err(ParseConnectionStateKindError(value.to_owned())),
        }
    }
}

/// Connection status together with the data each status carries.
///
/// A session reference exists only while connected and an error only in the
/// error state.
#[derive(Debug, Clone)]
pub enum ConnectionStatus {
    /// No session.
    Disconnected,
    /// Session establishment in progress.
    Connecting,
    /// Session established.
    Connected {
        /// Identifier of the live session.
        session: McpSessionId,
    },
    /// Last attempt failed.
    Error {
        /// The underlying cause.
        error: Arc<dyn Error + Send + Sync>,
    },
}

impl ConnectionStatus {
    /// Returns the lifecycle tag.
    #[must_use]
    pub const fn kind(&self) -> ConnectionStateKind {
        match self {
            Self::Disconnected => ConnectionStateKind::Disconnected,
            Self::Connecting => ConnectionStateKind::Connecting,
            Self::Connected { .. } => ConnectionStateKind::Connected,
            Self::Error { .. } => ConnectionStateKind::Error,
        }
    }
}

/// Counters tracked per server. Valid in every state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCounts {
    /// Number of tools currently registered for the server.
    pub tools: usize,
}

impl ToolCounts {
    /// Creates a counts record.
    #[must_use]
    pub const fn new(tools: usize) -> Self {
        Self { tools }
    }
}

/// Snapshot of one server's connection lifecycle.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    status: ConnectionStatus,
    counts: ToolCounts,
    updated_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            counts: ToolCounts::default(),
            updated_at: None,
        }
    }
}

impl ConnectionState {
    fn recorded(status: ConnectionStatus, counts: ToolCounts, clock: &impl Clock) -> Self {
        Self {
            status,
            counts,
            updated_at: Some(clock.utc()),
        }
    }

    /// Records a disconnected server.
    #[must_use]
    pub fn disconnected(counts: ToolCounts, clock: &impl Clock) -> Self {
        Self::recorded(ConnectionStatus::Disconnected, counts, clock)
    }

    /// Records a connection attempt in progress.
    #[must_use]
    pub fn connecting(counts: ToolCounts, clock: &impl Clock) -> Self {
        Self::recorded(ConnectionStatus::Connecting, counts, clock)
    }

    /// Records an established session.
    #[must_use]
    pub fn connected(session: McpSessionId, counts: ToolCounts, clock: &impl Clock) -> Self {
        Self::recorded(ConnectionStatus::Connected { session }, counts, clock)
    }

    /// Records a failure with its cause.
    #[must_use]
    pub fn failed(
        error: impl Error + Send + Sync + 'static,
        counts: ToolCounts,
        clock: &impl Clock,
    ) -> Self {
        Self::recorded(
            ConnectionStatus::Error {
                error: Arc::new(error),
            },
            counts,
            clock,
        )
    }

    /// Returns the status with its payload.
    #[must_use]
    pub const fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Returns the lifecycle tag.
    #[must_use]
    pub const fn kind(&self) -> ConnectionStateKind {
        self.status.kind()
    }

    /// Returns the recorded error when in the error state.
    #[must_use]
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync)> {
        match &self.status {
            ConnectionStatus::Error { error } => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Returns the live session identifier when connected.
    #[must_use]
    pub const fn session(&self) -> Option<McpSessionId> {
        match &self.status {
            ConnectionStatus::Connected { session } => Some(*session),
            _ => None,
        }
    }

    /// Returns the counts snapshot.
    #[must_use]
    pub const fn counts(&self) -> ToolCounts {
        self.counts
    }

    /// Returns when the state was recorded, or `None` if it never was.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
