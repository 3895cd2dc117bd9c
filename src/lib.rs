//! slcmd - Straylight command routing and argument-resolution engine.
//!
//! Turns a raw invocation (a label plus whitespace-separated tokens) into a
//! validated, typed call against a registered handler, enforcing sender kind,
//! permissions and cooldowns on the way, and answers completion requests for
//! partially typed input.
//!
//! ```ignore
//! let engine = CommandEngine::new();
//! engine.register(
//!     CommandDescriptor::builder("heal").permission("game.heal").build()?,
//!     vec![SubcommandPath::default_path(handler_fn(|ctx| {
//!         let amount = ctx.require::<i32>("amount")?;
//!         ctx.reply(&format!("Healed {amount}"));
//!         Ok(())
//!     }))
//!     .param(ParameterSpec::new::<i32>("amount").range(1.0, 20.0))
//!     .cooldown(Duration::from_secs(30))
//!     .build()?],
//! )?;
//! engine.dispatch(sender, "/heal 10").await.wait().await;
//! ```

pub mod args;
pub mod completion;
pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod sender;
pub mod telemetry;
pub mod tree;

pub use args::{ArgumentParser, ParseError, ParserRegistry, Text};
pub use completion::{CompletionContext, CompletionProvider, ProviderRegistry, provider_fn};
pub use config::Config;
pub use cooldown::{Clock, CooldownTracker, ManualClock, SystemClock};
pub use dispatch::{
    CommandContext, CommandEngine, CommandHandler, CommandResult, EngineBuilder, Invocation,
    Outcome, PendingResult, Scheduler, TokioScheduler, handler_fn,
};
pub use error::{CommandError, ErrorKind, HandlerError, HandlerResult, RegistrationError};
pub use sender::{CommandSender, SenderId};
pub use tree::{CommandDescriptor, ParameterSpec, SubcommandPath};
