//! Bounding transport calls by cancellation and timeouts.

use crate::mcp_client::ports::{McpTransportError, McpTransportResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs a transport operation until it completes, `limit` elapses, or
/// `cancel` fires. Cancellation and timeouts drop the in-flight future.
pub(super) async fn bounded<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    limit: Option<Duration>,
    future: impl Future<Output = McpTransportResult<T>>,
) -> McpTransportResult<T> {
    let timed = async {
        match limit {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .unwrap_or_else(|_| Err(McpTransportError::TimedOut { operation, timeout })),
            None => future.await,
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(McpTransportError::Cancelled),
        result = timed => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn completes_when_within_limit() {
        let cancel = CancellationToken::new();
        let result = bounded(&cancel, "ping", Some(Duration::from_secs(1)), async { Ok(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn times_out_slow_operations() {
        let cancel = CancellationToken::new();
        let result: McpTransportResult<()> =
            bounded(&cancel, "connect", Some(Duration::from_millis(20)), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(McpTransportError::TimedOut {
                operation: "connect",
                ..
            })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = bounded(&cancel, "call_tool", None, async { Ok(()) }).await;
        assert!(matches!(result, Err(McpTransportError::Cancelled)));
    }
}
