//! Per-request execution context.
//!
//! A `RequestContext` carries the correlation id, a cancellation token and
//! an optional deadline. It is passed explicitly through every stage of a
//! request so each awaited store call can be raced against both.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a guarded future did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interruption {
    #[error("request canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no deadline and a fresh cancellation token.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Set the deadline to `timeout` from now. A zero timeout means none.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = if timeout.is_zero() {
            None
        } else {
            Some(Instant::now() + timeout)
        };
        self
    }

    /// Cancel this context when `cancel` fires, e.g. on server shutdown.
    /// Canceling the context itself leaves `cancel` untouched.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel.child_token();
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context is already interrupted, if it is.
    pub fn interruption(&self) -> Option<Interruption> {
        if self.cancel.is_cancelled() {
            Some(Interruption::Canceled)
        } else if self.deadline.is_some_and(|d| d <= Instant::now()) {
            Some(Interruption::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Cancel this context and every clone sharing its token.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Await `fut` unless the context is canceled or its deadline passes first.
    ///
    /// Cancellation and the deadline are checked before `fut` is polled, so an
    /// already-interrupted context never runs the stage.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interruption>
    where
        F: Future<Output = T>,
    {
        if let Some(i) = self.interruption() {
            return Err(i);
        }

        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interruption::Canceled),
            _ = deadline => Err(Interruption::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_passes_through_output() {
        let ctx = RequestContext::new("req-1");
        let out = ctx.run(async { 41 + 1 }).await;
        assert_eq!(out, Ok(42));
        assert_eq!(ctx.request_id(), "req-1");
    }

    #[tokio::test]
    async fn canceled_context_never_polls_future() {
        let ctx = RequestContext::new("req-2");
        ctx.cancel();
        let out = ctx.run(async { panic!("stage must not run") }).await;
        assert_eq!(out, Err::<(), _>(Interruption::Canceled));
    }

    #[tokio::test]
    async fn cancel_while_pending() {
        let ctx = RequestContext::new("req-3");
        let token = ctx.cancel_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        let out = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(out, Err(Interruption::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_exceeded() {
        let ctx = RequestContext::new("req-4").with_timeout(Duration::from_millis(50));
        let out = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(out, Err(Interruption::DeadlineExceeded));
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let ctx = RequestContext::new("req-5").with_timeout(Duration::ZERO);
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn parent_token_cancels_request_but_not_the_reverse() {
        let shutdown = CancellationToken::new();
        let ctx = RequestContext::new("req-7").with_cancel(shutdown.clone());
        ctx.cancel();
        assert!(!shutdown.is_cancelled());

        let ctx = RequestContext::new("req-8").with_cancel(shutdown.clone());
        assert_eq!(ctx.interruption(), None);
        shutdown.cancel();
        assert_eq!(ctx.interruption(), Some(Interruption::Canceled));
        let out = ctx.run(async { panic!("stage must not run") }).await;
        assert_eq!(out, Err::<(), _>(Interruption::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn passed_deadline_is_an_interruption() {
        let ctx = RequestContext::new("req-9").with_timeout(Duration::from_millis(5));
        assert_eq!(ctx.interruption(), None);
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(ctx.interruption(), Some(Interruption::DeadlineExceeded));
    }

    #[tokio::test]
    async fn clones_share_cancellation() {
        let ctx = RequestContext::new("req-6");
        let other = ctx.clone();
        ctx.cancel();
        assert!(other.cancel_token().is_cancelled());
    }
}
