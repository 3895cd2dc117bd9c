//! Command dispatch.
//!
//! [`CommandEngine`] is the entry point: it owns the command tree, the parser
//! and provider registries, and the cooldown tracker, and runs invocations
//! through the pipeline in [`pipeline`].
//!
//! ## Entry points
//!
//! - [`CommandEngine::execute`] / [`CommandEngine::execute_invocation`]: run one
//!   invocation; asynchronous paths come back as [`Outcome::Pending`]
//! - [`CommandEngine::execute_async`]: run the whole pipeline on the scheduler
//! - [`CommandEngine::dispatch`]: tokenize and run a raw input line
//! - [`CommandEngine::can_execute`]: dry run of the gates, no side effects

mod context;
mod handler;
pub(crate) mod pipeline;
mod result;
mod scheduler;

pub use context::CommandContext;
pub use handler::{CommandHandler, FnHandler, handler_fn};
pub use result::{CommandResult, Outcome};
pub use scheduler::{PendingResult, Scheduler, TokioScheduler};

use crate::args::ParserRegistry;
use crate::completion::{CompletionEngine, ProviderRegistry};
use crate::config::Config;
use crate::cooldown::{Clock, CooldownTracker, SystemClock};
use crate::error::RegistrationError;
use crate::metrics;
use crate::sender::{CommandSender, SenderId};
use crate::telemetry::spans;
use crate::tree::{
    CommandDescriptor, CommandTree, RegisteredCommand, SubcommandPath, check_params,
};
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One invocation: who, which label, which argument tokens.
#[derive(Clone)]
pub struct Invocation {
    pub sender: Arc<dyn CommandSender>,
    pub label: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(sender: Arc<dyn CommandSender>, label: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sender,
            label: label.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a raw line on whitespace. One leading `/` is stripped; there is
    /// no quoting.
    pub fn parse_line(sender: Arc<dyn CommandSender>, line: &str) -> Self {
        let line = line.trim_start();
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut tokens = line.split_whitespace();
        let label = tokens.next().unwrap_or_default();
        Self::new(sender, label, tokens)
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("sender", &self.sender.id())
            .field("label", &self.label)
            .field("args", &self.args)
            .finish()
    }
}

pub(crate) struct EngineInner {
    pub(crate) tree: CommandTree,
    pub(crate) parsers: ParserRegistry,
    pub(crate) providers: ProviderRegistry,
    pub(crate) cooldowns: CooldownTracker,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) config: Config,
}

/// Builder for [`CommandEngine`].
pub struct EngineBuilder {
    config: Config,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    parsers: Option<ParserRegistry>,
}

impl EngineBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler<S: Scheduler>(mut self, scheduler: S) -> Self {
        self.scheduler = Arc::new(scheduler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start from this registry instead of the built-in parsers.
    pub fn parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = Some(parsers);
        self
    }

    pub fn build(self) -> CommandEngine {
        CommandEngine {
            inner: Arc::new(EngineInner {
                tree: CommandTree::new(),
                parsers: self.parsers.unwrap_or_else(ParserRegistry::with_builtins),
                providers: ProviderRegistry::new(),
                cooldowns: CooldownTracker::new(self.clock),
                scheduler: self.scheduler,
                config: self.config,
            }),
        }
    }
}

/// The command routing engine. Cloning shares all state.
#[derive(Clone)]
pub struct CommandEngine {
    pub(crate) inner: Arc<EngineInner>,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CommandEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            config: Config::default(),
            scheduler: Arc::new(TokioScheduler),
            clock: Arc::new(SystemClock),
            parsers: None,
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a root command with its paths.
    ///
    /// Besides the tree's own checks, parameters bound to greedy parsers must
    /// be last.
    pub fn register(
        &self,
        descriptor: CommandDescriptor,
        paths: Vec<SubcommandPath>,
    ) -> Result<Arc<RegisteredCommand>, RegistrationError> {
        for path in &paths {
            check_params(&path.segments().join(" "), path.params(), |spec| {
                spec.is_greedy()
                    || self
                        .inner
                        .parsers
                        .lookup(spec.type_key())
                        .is_ok_and(|p| p.is_greedy())
            })?;
        }
        let command = self.inner.tree.register(descriptor, paths)?;
        metrics::set_registered_commands(self.inner.tree.len());
        Ok(command)
    }

    pub fn unregister(&self, label: &str) -> bool {
        let removed = self.inner.tree.unregister(label);
        metrics::set_registered_commands(self.inner.tree.len());
        removed
    }

    pub fn unregister_all(&self) {
        self.inner.tree.unregister_all();
        metrics::set_registered_commands(0);
    }

    pub fn tree(&self) -> &CommandTree {
        &self.inner.tree
    }

    pub fn parsers(&self) -> &ParserRegistry {
        &self.inner.parsers
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.inner.providers
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.inner.cooldowns
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Run `label args...` for `sender`.
    pub async fn execute(
        &self,
        sender: Arc<dyn CommandSender>,
        label: &str,
        args: &[&str],
    ) -> Outcome {
        self.execute_invocation(Invocation::new(sender, label, args.iter().copied()))
            .await
    }

    pub async fn execute_invocation(&self, invocation: Invocation) -> Outcome {
        pipeline::run(self, invocation).await
    }

    /// Run the whole pipeline on the scheduler.
    pub fn execute_async(&self, invocation: Invocation) -> PendingResult {
        let engine = self.clone();
        let task = async move { engine.execute_invocation(invocation).await.wait().await }.boxed();
        self.inner.scheduler.submit(task)
    }

    /// Tokenize and run a raw input line.
    pub async fn dispatch(&self, sender: Arc<dyn CommandSender>, line: &str) -> Outcome {
        self.execute_invocation(Invocation::parse_line(sender, line))
            .await
    }

    /// Whether the gates (resolution, sender kind, permissions, cooldown)
    /// would let this invocation through. Parses nothing and never touches
    /// cooldown state.
    pub fn can_execute(&self, sender: &dyn CommandSender, label: &str, args: &[&str]) -> bool {
        let Ok(resolution) = self.inner.tree.resolve(label, args) else {
            return false;
        };
        if pipeline::check_root(sender, &resolution.command).is_err() {
            return false;
        }
        let Some(path) = resolution.path else {
            return false;
        };
        if pipeline::check_path(sender, &path).is_err() {
            return false;
        }
        match pipeline::cooldown_window(self, sender, &path) {
            Some(window) => self
                .inner
                .cooldowns
                .remaining(
                    sender.id(),
                    &path.qualified_name(resolution.command.name()),
                    window,
                )
                .is_zero(),
            None => true,
        }
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    /// Resolve `"label seg seg"` to its root and path.
    fn find_command(&self, command: &str) -> Option<(Arc<RegisteredCommand>, Arc<SubcommandPath>)> {
        let mut words = command.split_whitespace();
        let root = self.inner.tree.get(words.next()?)?;
        let segments: Vec<&str> = words.collect();
        let path = root.find_path(&segments)?.clone();
        Some((root, path))
    }

    /// Cooldown left for `sender` on `command` (`"root"` or `"root seg..."`,
    /// aliases accepted). Zero for unknown commands.
    pub fn remaining_cooldown(&self, sender: SenderId, command: &str) -> Duration {
        let Some((root, path)) = self.find_command(command) else {
            return Duration::ZERO;
        };
        let Some(window) = path.cooldown().window() else {
            return Duration::ZERO;
        };
        self.inner
            .cooldowns
            .remaining(sender, &path.qualified_name(root.name()), window)
    }

    /// Forget the cooldown of `sender` on `command`.
    pub fn clear_cooldown(&self, sender: SenderId, command: &str) -> bool {
        let key = match self.find_command(command) {
            Some((root, path)) => path.qualified_name(root.name()),
            None => command.split_whitespace().collect::<Vec<_>>().join(" "),
        };
        let cleared = self.inner.cooldowns.clear(sender, &key);
        debug!(sender = %sender, command = %key, cleared, "Cleared cooldown");
        cleared
    }

    /// Periodically drop elapsed cooldown entries, per `cooldown.sweep_interval_secs`.
    ///
    /// Returns `None` when sweeping is disabled.
    pub fn spawn_cooldown_sweeper(&self) -> Option<tokio::task::JoinHandle<()>> {
        let period = self.inner.config.cooldown.sweep_interval()?;
        let cooldowns = self.inner.cooldowns.clone();
        info!(interval_secs = period.as_secs(), "Starting cooldown sweeper");
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cooldowns.purge_expired();
            }
        }))
    }

    // ------------------------------------------------------------------
    // Help and completion
    // ------------------------------------------------------------------

    /// Usage lines for the paths of `label` that `sender` may use.
    pub fn help(&self, sender: &dyn CommandSender, label: &str) -> Vec<String> {
        let Some(command) = self.inner.tree.get(label) else {
            return Vec::new();
        };
        if pipeline::check_root(sender, &command).is_err() {
            return Vec::new();
        }
        command
            .paths()
            .iter()
            .filter(|p| !p.is_hidden() && pipeline::may_use(sender, p))
            .map(|p| match p.description() {
                Some(description) => format!("{} - {description}", p.usage(label)),
                None => p.usage(label),
            })
            .collect()
    }

    fn completion(&self) -> CompletionEngine<'_> {
        CompletionEngine {
            tree: &self.inner.tree,
            parsers: &self.inner.parsers,
            providers: &self.inner.providers,
            max_suggestions: self.inner.config.completion.max_suggestions,
        }
    }

    /// Candidates for the last of `args`, which is the token being typed
    /// (empty when the cursor follows a space).
    pub fn complete(&self, sender: &Arc<dyn CommandSender>, label: &str, args: &[&str]) -> Vec<String> {
        let _span = spans::completion(label, sender.name()).entered();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.completion().complete(sender, label, &args)
    }

    /// Candidates for a whole input line, including root labels.
    pub fn complete_line(&self, sender: &Arc<dyn CommandSender>, line: &str) -> Vec<String> {
        let trimmed = line.trim_start();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let ends_with_space = trimmed.ends_with(char::is_whitespace);

        if tokens.len() <= 1 && !ends_with_space {
            let partial = tokens.first().copied().unwrap_or_default();
            return self.completion().complete_roots(sender.as_ref(), partial);
        }
        if ends_with_space {
            tokens.push("");
        }
        let label = tokens.remove(0);
        self.complete(sender, label, &tokens)
    }
}
