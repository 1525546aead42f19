//! Session registry with single-flight renewal per server.

use super::{ConnectionError, deadline::bounded};
use crate::mcp_client::{
    config::McpClientConfig,
    domain::{ConnectionState, McpServerName, McpSessionId},
    ports::{McpConnector, McpSession, McpTransportError, McpTransportResult},
    stores::ConnectionStateStore,
};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use mockable::Clock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio_util::sync::CancellationToken;

/// A live session and the identifier minted when it was established.
#[derive(Clone)]
pub struct SessionHandle {
    id: McpSessionId,
    session: Arc<dyn McpSession>,
}

impl SessionHandle {
    /// Wraps a freshly established session under a new identifier.
    #[must_use]
    pub fn new(session: Arc<dyn McpSession>) -> Self {
        Self {
            id: McpSessionId::new(),
            session,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> McpSessionId {
        self.id
    }

    /// Returns the underlying transport session.
    #[must_use]
    pub fn session(&self) -> &dyn McpSession {
        self.session.as_ref()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

type RenewalResult = Result<SessionHandle, McpTransportError>;
type SharedRenewal = Shared<BoxFuture<'static, RenewalResult>>;

struct TrackedSession {
    handle: SessionHandle,
    stale: bool,
}

/// A connection attempt running in its own task.
struct PendingRenewal {
    attempt: u64,
    cancel: CancellationToken,
    result: SharedRenewal,
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<McpServerName, TrackedSession>,
    pending: HashMap<McpServerName, PendingRenewal>,
    next_attempt: u64,
}

impl RegistryState {
    /// Removes the pending entry for `server` if it still belongs to
    /// `attempt`.
    fn finish(&mut self, server: &McpServerName, attempt: u64) -> bool {
        let current = self
            .pending
            .get(server)
            .is_some_and(|pending| pending.attempt == attempt);
        if current {
            self.pending.remove(server);
        }
        current
    }
}

enum Acquisition {
    Probe(SessionHandle),
    Renew(Renewal),
}

enum Renewal {
    Ready(SessionHandle),
    Pending {
        renewal: SharedRenewal,
        initiated: bool,
    },
}

struct RegistryCore<K, C> {
    connector: Arc<K>,
    states: Arc<ConnectionStateStore>,
    clock: Arc<C>,
    config: McpClientConfig,
    state: Mutex<RegistryState>,
}

impl<K, C> RegistryCore<K, C>
where
    K: McpConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(
        self: &Arc<Self>,
        server: &McpServerName,
        cancel: &CancellationToken,
    ) -> Acquisition {
        let mut state = self.lock();
        if let Some(pending) = state.pending.get(server) {
            return Acquisition::Renew(Renewal::Pending {
                renewal: pending.result.clone(),
                initiated: false,
            });
        }

        let reusable = state
            .sessions
            .get(server)
            .filter(|tracked| !tracked.stale)
            .map(|tracked| tracked.handle.clone());
        if let Some(handle) = reusable {
            return Acquisition::Probe(handle);
        }

        Acquisition::Renew(self.start_renewal(&mut state, server, cancel))
    }

    fn renew_after_failed_probe(
        self: &Arc<Self>,
        server: &McpServerName,
        cancel: &CancellationToken,
        failed: McpSessionId,
    ) -> Renewal {
        let mut state = self.lock();
        if let Some(pending) = state.pending.get(server) {
            return Renewal::Pending {
                renewal: pending.result.clone(),
                initiated: false,
            };
        }

        if let Some(tracked) = state.sessions.get_mut(server) {
            if tracked.handle.id() == failed {
                tracked.stale = true;
            } else if !tracked.stale {
                // Another caller already replaced the failed session.
                return Renewal::Ready(tracked.handle.clone());
            }
        }

        self.start_renewal(&mut state, server, cancel)
    }

    fn start_renewal(
        self: &Arc<Self>,
        state: &mut RegistryState,
        server: &McpServerName,
        cancel: &CancellationToken,
    ) -> Renewal {
        let superseded = state
            .sessions
            .get(server)
            .map(|tracked| tracked.handle.clone());
        let attempt = state.next_attempt;
        state.next_attempt = state.next_attempt.wrapping_add(1);
        let attempt_cancel = cancel.child_token();
        let counts = self.states.get(server).counts();
        self.states
            .update(server, ConnectionState::connecting(counts, &*self.clock));

        let task = tokio::spawn(Arc::clone(self).renew(
            server.clone(),
            attempt,
            attempt_cancel.clone(),
            superseded,
        ));
        let result = Self::join_renewal(Arc::downgrade(self), server.clone(), attempt, task)
            .boxed()
            .shared();
        state.pending.insert(
            server.clone(),
            PendingRenewal {
                attempt,
                cancel: attempt_cancel,
                result: result.clone(),
            },
        );
        Renewal::Pending {
            renewal: result,
            initiated: true,
        }
    }

    async fn join_renewal(
        core: Weak<Self>,
        server: McpServerName,
        attempt: u64,
        task: tokio::task::JoinHandle<RenewalResult>,
    ) -> RenewalResult {
        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                let error = McpTransportError::runtime(join_error);
                if let Some(registry) = core.upgrade() {
                    registry.abandon(&server, attempt, &error);
                }
                Err(error)
            }
        }
    }

    async fn renew(
        self: Arc<Self>,
        server: McpServerName,
        attempt: u64,
        cancel: CancellationToken,
        superseded: Option<SessionHandle>,
    ) -> RenewalResult {
        let outcome = bounded(
            &cancel,
            "connect",
            Some(self.config.connect_timeout()),
            self.connector.connect(&server),
        )
        .await;

        match outcome {
            Ok(session) => self.install(&server, attempt, session, superseded).await,
            Err(error) => {
                self.abandon(&server, attempt, &error);
                Err(error)
            }
        }
    }

    async fn install(
        &self,
        server: &McpServerName,
        attempt: u64,
        session: Arc<dyn McpSession>,
        superseded: Option<SessionHandle>,
    ) -> RenewalResult {
        let handle = SessionHandle::new(session);
        let installed = {
            let mut state = self.lock();
            let current = state.finish(server, attempt);
            if current {
                state.sessions.insert(
                    server.clone(),
                    TrackedSession {
                        handle: handle.clone(),
                        stale: false,
                    },
                );
                let counts = self.states.get(server).counts();
                self.states.update(
                    server,
                    ConnectionState::connected(handle.id(), counts, &*self.clock),
                );
            }
            current
        };
        if !installed {
            tracing::debug!(
                server = %server,
                session = %handle.id(),
                "MCP server was closed while connecting, discarding session"
            );
            self.close_session(server, &handle).await;
            return Err(McpTransportError::Cancelled);
        }
        tracing::info!(server = %server, session = %handle.id(), "MCP session established");

        if let Some(previous) = superseded {
            self.close_session(server, &previous).await;
        }
        Ok(handle)
    }

    fn abandon(&self, server: &McpServerName, attempt: u64, error: &McpTransportError) {
        let mut state = self.lock();
        if !state.finish(server, attempt) {
            return;
        }
        let counts = self.states.get(server).counts();
        let cause = ConnectionError::new(server.clone(), error.clone());
        self.states.update(
            server,
            ConnectionState::failed(cause, counts, &*self.clock),
        );
        drop(state);
        tracing::warn!(server = %server, error = %error, "MCP session could not be established");
    }

    async fn probe(
        &self,
        cancel: &CancellationToken,
        handle: &SessionHandle,
    ) -> McpTransportResult<()> {
        bounded(
            cancel,
            "ping",
            Some(self.config.ping_timeout()),
            handle.session().ping(),
        )
        .await
    }

    async fn close_session(&self, server: &McpServerName, handle: &SessionHandle) {
        let limit = self.config.ping_timeout();
        match tokio::time::timeout(limit, handle.session().close()).await {
            Ok(Ok(())) => {
                tracing::debug!(server = %server, session = %handle.id(), "MCP session closed");
            }
            Ok(Err(error)) => {
                tracing::warn!(
                    server = %server,
                    session = %handle.id(),
                    error = %error,
                    "failed to close MCP session"
                );
            }
            Err(_) => {
                tracing::warn!(
                    server = %server,
                    session = %handle.id(),
                    timeout = ?limit,
                    "timed out closing MCP session"
                );
            }
        }
    }
}

/// Tracks one live session per server and (re)establishes sessions on
/// demand.
///
/// At most one connection attempt per server is in flight at a time: callers
/// arriving while an attempt runs await its shared result. Attempts for
/// different servers never wait on each other.
///
/// A tracked session is reused after a successful liveness ping. A failed
/// ping, or a session marked stale with [`SessionRegistry::invalidate`],
/// leads to a renewal; the superseded session is closed once its replacement
/// is installed. Failures are recorded in the [`ConnectionStateStore`] and
/// returned; there is no internal retry.
pub struct SessionRegistry<K, C>
where
    K: McpConnector,
    C: Clock + Send + Sync,
{
    core: Arc<RegistryCore<K, C>>,
}

impl<K, C> SessionRegistry<K, C>
where
    K: McpConnector + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a registry that records state transitions in `states`.
    #[must_use]
    pub fn new(
        connector: Arc<K>,
        states: Arc<ConnectionStateStore>,
        clock: Arc<C>,
        config: McpClientConfig,
    ) -> Self {
        Self {
            core: Arc::new(RegistryCore {
                connector,
                states,
                clock,
                config,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Returns a usable session for `server`, connecting or renewing as
    /// needed.
    ///
    /// Cancelling `cancel` abandons this caller's wait. When this caller
    /// started the connection attempt, the attempt itself is cancelled and
    /// every caller sharing it receives the cancellation error. The attempt
    /// runs in its own task, so dropping the returned future leaves it to
    /// finish and install its session.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] when the session cannot be established,
    /// the attempt times out, or the wait is cancelled.
    pub async fn get_or_renew(
        &self,
        cancel: &CancellationToken,
        server: &McpServerName,
    ) -> Result<SessionHandle, ConnectionError> {
        let renewal = match self.core.begin(server, cancel) {
            Acquisition::Renew(renewal) => renewal,
            Acquisition::Probe(handle) => match self.core.probe(cancel, &handle).await {
                Ok(()) => return Ok(handle),
                Err(McpTransportError::Cancelled) => {
                    return Err(ConnectionError::new(
                        server.clone(),
                        McpTransportError::Cancelled,
                    ));
                }
                Err(error) => {
                    tracing::warn!(
                        server = %server,
                        session = %handle.id(),
                        error = %error,
                        "MCP session failed liveness check, renewing"
                    );
                    self.core
                        .renew_after_failed_probe(server, cancel, handle.id())
                }
            },
        };

        let outcome = match renewal {
            Renewal::Ready(handle) => Ok(handle),
            Renewal::Pending {
                renewal: pending,
                initiated: true,
            } => pending.await,
            Renewal::Pending {
                renewal: pending,
                initiated: false,
            } => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(McpTransportError::Cancelled),
                    result = pending => result,
                }
            }
        };

        outcome.map_err(|source| ConnectionError::new(server.clone(), source))
    }

    /// Returns the session currently tracked for `server` without any I/O.
    #[must_use]
    pub fn get(&self, server: &McpServerName) -> Option<SessionHandle> {
        self.core
            .lock()
            .sessions
            .get(server)
            .map(|tracked| tracked.handle.clone())
    }

    /// Marks `session` as stale so the next [`Self::get_or_renew`] replaces
    /// it without pinging first.
    ///
    /// Has no effect when `session` is no longer the tracked session.
    pub fn invalidate(&self, server: &McpServerName, session: McpSessionId) {
        let mut state = self.core.lock();
        if let Some(tracked) = state.sessions.get_mut(server)
            && tracked.handle.id() == session
        {
            tracked.stale = true;
            tracing::debug!(server = %server, session = %session, "MCP session marked stale");
        }
    }

    /// Returns the servers with a tracked session, sorted by name.
    #[must_use]
    pub fn tracked_servers(&self) -> Vec<McpServerName> {
        let mut servers: Vec<_> = self.core.lock().sessions.keys().cloned().collect();
        servers.sort();
        servers
    }

    /// Closes and forgets the session for `server`, recording it as
    /// disconnected.
    ///
    /// A connection attempt still in flight is cancelled; callers waiting on
    /// it receive the cancellation error.
    ///
    /// Returns `false` when neither a session nor an attempt was tracked.
    pub async fn close(&self, server: &McpServerName) -> bool {
        let (removed, pending) = {
            let mut state = self.core.lock();
            let removed = state.sessions.remove(server);
            let pending = state.pending.remove(server);
            if removed.is_none() && pending.is_none() {
                return false;
            }
            let counts = self.core.states.get(server).counts();
            self.core.states.update(
                server,
                ConnectionState::disconnected(counts, &*self.core.clock),
            );
            (removed, pending)
        };

        if let Some(attempt) = pending {
            attempt.cancel.cancel();
            tracing::debug!(server = %server, "cancelled MCP connection attempt on close");
        }
        if let Some(tracked) = removed {
            self.core.close_session(server, &tracked.handle).await;
        }
        true
    }

    /// Closes every tracked session and cancels every attempt in flight.
    pub async fn close_all(&self) {
        let servers: Vec<_> = {
            let state = self.core.lock();
            let mut servers: Vec<_> = state
                .sessions
                .keys()
                .chain(state.pending.keys())
                .cloned()
                .collect();
            servers.sort();
            servers.dedup();
            servers
        };
        join_all(servers.iter().map(|server| self.close(server))).await;
    }

    /// Returns the connection state store this registry records into.
    #[must_use]
    pub fn states(&self) -> &Arc<ConnectionStateStore> {
        &self.core.states
    }
}
