//! Connection state store.

use crate::mcp_client::config::{MAX_EVENT_CAPACITY, McpClientConfig};
use crate::mcp_client::domain::{ConnectionState, McpServerName};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

/// A state change published by [`ConnectionStateStore`].
#[derive(Debug, Clone)]
pub struct ConnectionStateEvent {
    /// Server whose state changed.
    pub server: McpServerName,
    /// The newly recorded state.
    pub state: ConnectionState,
}

/// Per-server connection state, keyed by server name.
///
/// Entries are created on first update and live as long as the store.
/// Reading a name that was never recorded yields
/// [`ConnectionState::default`] (disconnected, zero counts).
#[derive(Debug)]
pub struct ConnectionStateStore {
    states: RwLock<HashMap<McpServerName, ConnectionState>>,
    events: broadcast::Sender<ConnectionStateEvent>,
}

impl ConnectionStateStore {
    /// Creates an empty store whose subscribers may lag by up to
    /// `event_capacity` events, clamped to `1..=MAX_EVENT_CAPACITY`.
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self {
            states: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Returns the current state for `server`.
    #[must_use]
    pub fn get(&self, server: &McpServerName) -> ConnectionState {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(server)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the state for `server` and notifies subscribers.
    ///
    /// There is no partial update: callers that want to keep the counts read
    /// them first and pass them into the new state.
    pub fn update(&self, server: &McpServerName, state: ConnectionState) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(server = %server, state = %state.kind(), "connection state updated");
        states.insert(server.clone(), state.clone());
        // Sending while the write lock is held keeps events in update order.
        let event = ConnectionStateEvent {
            server: server.clone(),
            state,
        };
        if self.events.send(event).is_err() {
            tracing::trace!(server = %server, "no connection state subscribers");
        }
    }

    /// Returns every recorded state, sorted by server name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(McpServerName, ConnectionState)> {
        let mut entries: Vec<_> = self
            .states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect();
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        entries
    }

    /// Subscribes to state changes recorded after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionStateEvent> {
        self.events.subscribe()
    }
}

impl Default for ConnectionStateStore {
    fn default() -> Self {
        Self::new(McpClientConfig::default().event_capacity())
    }
}
