//! Client configuration: timeouts and event buffering.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Largest accepted state-event buffer capacity.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Errors returned while validating client configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum McpClientConfigError {
    /// A timeout was zero.
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    /// The state-event buffer capacity was zero.
    #[error("state event capacity must be greater than zero")]
    ZeroEventCapacity,

    /// The state-event buffer capacity exceeded [`MAX_EVENT_CAPACITY`].
    #[error("state event capacity {0} exceeds the maximum of {max}", max = MAX_EVENT_CAPACITY)]
    EventCapacityTooLarge(usize),
}

/// Configuration for the MCP client services.
///
/// Durations are (de)serialized as milliseconds so the value can be embedded
/// in a host application's configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpClientConfig {
    #[serde(with = "millis", rename = "connect_timeout_ms")]
    connect_timeout: Duration,
    #[serde(with = "millis", rename = "ping_timeout_ms")]
    ping_timeout: Duration,
    #[serde(with = "millis", rename = "list_timeout_ms")]
    list_timeout: Duration,
    #[serde(with = "optional_millis", rename = "call_timeout_ms")]
    call_timeout: Option<Duration>,
    event_capacity: usize,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            call_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl McpClientConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bound on session establishment.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the bound on the liveness ping made before reusing a session.
    #[must_use]
    pub const fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Sets the bound on tool listing during refresh.
    #[must_use]
    pub const fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    /// Bounds tool calls. Calls are unbounded by default.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Sets how many state-change events a slow subscriber may fall behind.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Checks the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientConfigError`] when a timeout or the event capacity
    /// is zero, or the event capacity exceeds [`MAX_EVENT_CAPACITY`].
    pub fn validate(self) -> Result<Self, McpClientConfigError> {
        let timeouts = [
            ("connect", Some(self.connect_timeout)),
            ("ping", Some(self.ping_timeout)),
            ("list", Some(self.list_timeout)),
            ("call", self.call_timeout),
        ];
        for (label, timeout) in timeouts {
            if timeout.is_some_and(|value| value.is_zero()) {
                return Err(McpClientConfigError::ZeroTimeout(label));
            }
        }

        if self.event_capacity == 0 {
            return Err(McpClientConfigError::ZeroEventCapacity);
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(McpClientConfigError::EventCapacityTooLarge(
                self.event_capacity,
            ));
        }

        Ok(self)
    }

    /// Returns the session establishment bound.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the liveness ping bound.
    #[must_use]
    pub const fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    /// Returns the tool listing bound.
    #[must_use]
    pub const fn list_timeout(&self) -> Duration {
        self.list_timeout
    }

    /// Returns the tool call bound, if any.
    #[must_use]
    pub const fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    /// Returns the state-change event buffer capacity.
    #[must_use]
    pub const fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod optional_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[expect(
        clippy::ref_option,
        reason = "serde `with` modules receive a reference to the field"
    )]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => super::millis::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|value| value.map(Duration::from_millis))
    }
}
