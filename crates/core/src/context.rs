//! Per-request execution context: cancellation plus an optional deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Carries the caller's cancellation signal and deadline into the engine.
///
/// [`RequestContext::run`] drops the operation future as soon as either
/// fires. Dropping the future drops any open transaction, which rolls it back.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Tie the context to an externally owned token.
    pub fn with_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `operation` to completion unless cancelled or out of time first.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled(format!("{operation} was cancelled")));
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::warn!(operation, "Operation cancelled, transaction rolled back");
                Err(CoreError::Cancelled(format!("{operation} was cancelled")))
            }
            () = deadline => {
                tracing::warn!(operation, "Operation deadline exceeded, outcome unknown");
                Err(CoreError::DeadlineExceeded(format!(
                    "{operation} did not finish in time; outcome unknown"
                )))
            }
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn passes_through_result() {
        let ctx = RequestContext::new();
        let value = ctx
            .run("op", async { Ok::<_, CoreError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn pre_cancelled_context_never_polls_operation() {
        let polled = std::sync::atomic::AtomicBool::new(false);
        let ctx = RequestContext::new();
        ctx.cancel();
        let result = ctx
            .run("op", async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<_, CoreError>(())
            })
            .await;
        assert_matches!(result, Err(CoreError::Cancelled(_)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_operation() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run("op", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, CoreError>(())
            })
            .await;
        assert_matches!(result, Err(CoreError::DeadlineExceeded(_)));
    }

    #[tokio::test]
    async fn external_token_cancels() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_token(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
