//! Scheduling seam for asynchronous handlers.

use super::CommandResult;
use crate::error::{ErrorKind, HandlerError};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::error;

/// Runs asynchronous handler work off the dispatching task.
pub trait Scheduler: Send + Sync + 'static {
    /// Start `task` and return a handle to its result.
    fn submit(&self, task: BoxFuture<'static, CommandResult>) -> PendingResult;
}

/// Spawns each task on the current tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn submit(&self, task: BoxFuture<'static, CommandResult>) -> PendingResult {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(task);
        tokio::spawn(async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    error!(error = %join_err, "Command task failed");
                    aborted()
                }
            };
            let _ = tx.send(result);
        });
        PendingResult::channel(rx)
    }
}

fn aborted() -> CommandResult {
    CommandResult::failure(ErrorKind::Handler, HandlerError::Aborted.to_string())
}

/// Future resolving to the result of a scheduled handler.
///
/// Resolves to a `Handler` failure if the task is dropped before it
/// reports.
#[derive(Debug)]
pub struct PendingResult {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Ready(Option<CommandResult>),
    Channel(oneshot::Receiver<CommandResult>),
}

impl PendingResult {
    /// A result that is already known.
    pub fn ready(result: CommandResult) -> Self {
        Self {
            inner: Inner::Ready(Some(result)),
        }
    }

    /// A result delivered through a oneshot channel.
    pub fn channel(rx: oneshot::Receiver<CommandResult>) -> Self {
        Self {
            inner: Inner::Channel(rx),
        }
    }
}

impl Future for PendingResult {
    type Output = CommandResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<CommandResult> {
        match &mut self.inner {
            Inner::Ready(result) => Poll::Ready(result.take().unwrap_or_else(aborted)),
            Inner::Channel(rx) => Pin::new(rx).poll(cx).map(|r| r.unwrap_or_else(|_| aborted())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    #[tokio::test]
    async fn tokio_scheduler_delivers_result() {
        let pending = TokioScheduler.submit(async { CommandResult::success() }.boxed());
        assert!(pending.await.is_success());
    }

    #[tokio::test]
    async fn panicking_task_reports_aborted() {
        let pending = TokioScheduler.submit(
            async {
                let fail = true;
                if fail {
                    panic!("boom");
                }
                CommandResult::success()
            }
            .boxed(),
        );
        let result = pending.await;
        assert_eq!(result.kind, Some(ErrorKind::Handler));
        assert_eq!(result.message.as_deref(), Some("handler task did not complete"));
    }

    #[tokio::test]
    async fn dropped_sender_reports_aborted() {
        let (tx, rx) = oneshot::channel();
        drop(tx);
        assert!(!PendingResult::channel(rx).await.is_success());
    }

    #[tokio::test]
    async fn ready_result() {
        assert!(PendingResult::ready(CommandResult::success()).await.is_success());
    }
}
