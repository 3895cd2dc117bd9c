//! Command handler trait.

use super::CommandContext;
use crate::error::HandlerResult;
use async_trait::async_trait;

/// Body of a subcommand path.
///
/// Inline handlers are awaited on the dispatching task. Handlers of
/// asynchronous paths run on the engine's scheduler with a shared context.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn handle(&self, ctx: &CommandContext) -> HandlerResult;
}

/// Adapter for synchronous closures.
pub struct FnHandler<F>(F);

/// Wrap a synchronous closure as a [`CommandHandler`].
///
/// ```ignore
/// SubcommandPath::builder("ping", handler_fn(|ctx| {
///     ctx.reply("pong");
///     Ok(())
/// }))
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&CommandContext) -> HandlerResult + Send + Sync + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&CommandContext) -> HandlerResult + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &CommandContext) -> HandlerResult {
        (self.0)(ctx)
    }
}
