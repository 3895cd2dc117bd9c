//! The dispatch pipeline.
//!
//! Resolve, gate (sender kind, permissions), reserve the cooldown, assign
//! tokens, parse and validate, invoke, record, report. Every step may end the
//! dispatch; whatever happens, exactly one [`CommandResult`] comes out and
//! failures are reported to the sender.

use super::{CommandContext, CommandEngine, CommandHandler, CommandResult, Invocation, Outcome};
use crate::args::format_duration;
use crate::config::render;
use crate::cooldown::CooldownPermit;
use crate::error::{ArityProblem, CommandError, HandlerError, HandlerResult};
use crate::metrics;
use crate::sender::CommandSender;
use crate::telemetry::{CommandTimer, spans};
use crate::tree::{Execution, RegisteredCommand, Resolution, SubcommandPath};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, error, warn};

/// Metric label for dispatches that never resolved a root.
const UNRESOLVED: &str = "unknown";

/// Run one invocation through the pipeline.
pub(super) async fn run(engine: &CommandEngine, invocation: Invocation) -> Outcome {
    let span = spans::command(&invocation.label, invocation.sender.name());
    run_inner(engine, invocation).instrument(span).await
}

async fn run_inner(engine: &CommandEngine, invocation: Invocation) -> Outcome {
    let Invocation {
        sender,
        label,
        args,
    } = invocation;

    let resolution = match engine.inner.tree.resolve(&label, &args) {
        Ok(resolution) => resolution,
        Err(err) => {
            let _timer = CommandTimer::new(UNRESOLVED);
            return Outcome::Completed(report(engine, sender.as_ref(), UNRESOLVED, err));
        }
    };

    let root = resolution.command.name().to_string();
    let timer = CommandTimer::new(root.clone());

    let Prepared { path, ctx, permit } =
        match prepare(engine, &sender, &label, args, resolution) {
            Ok(prepared) => prepared,
            Err(err) => {
                return Outcome::Completed(report(engine, sender.as_ref(), &root, err));
            }
        };
    let handler = path.handler().clone();

    match path.execution() {
        Execution::Inline => {
            let result = invoke(handler.as_ref(), &ctx).await;
            drop(timer);
            Outcome::Completed(finish(engine, sender.as_ref(), &root, permit, result))
        }
        Execution::Async => {
            let scheduler = engine.inner.scheduler.clone();
            let engine = engine.clone();
            let span = spans::handler_task(&path.qualified_name(&root), sender.name());
            let task = async move {
                let result = invoke(handler.as_ref(), &ctx).await;
                drop(timer);
                finish(&engine, sender.as_ref(), &root, permit, result)
            }
            .instrument(span)
            .boxed();
            debug!("Submitted handler to scheduler");
            Outcome::Pending(scheduler.submit(task))
        }
    }
}

/// Run the handler, turning a panic into [`HandlerError::Aborted`].
async fn invoke(handler: &dyn CommandHandler, ctx: &CommandContext) -> HandlerResult {
    match AssertUnwindSafe(handler.handle(ctx)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(panic = %reason, "Handler panicked");
            Err(HandlerError::Aborted)
        }
    }
}

/// A dispatch that passed every gate and is ready to invoke.
struct Prepared {
    path: Arc<SubcommandPath>,
    ctx: CommandContext,
    permit: Option<CooldownPermit>,
}

fn prepare(
    engine: &CommandEngine,
    sender: &Arc<dyn CommandSender>,
    label: &str,
    args: Vec<String>,
    resolution: Resolution,
) -> Result<Prepared, CommandError> {
    let Resolution {
        command,
        path,
        residual,
        ..
    } = resolution;

    check_root(sender.as_ref(), &command)?;
    let Some(path) = path else {
        return Err(CommandError::UnknownSubcommand {
            command: label.to_string(),
            usage: subcommand_usage(sender.as_ref(), &command, label),
        });
    };
    check_path(sender.as_ref(), &path)?;

    let permit = reserve_cooldown(engine, sender.as_ref(), &command, &path)?;

    let tokens = assign_tokens(engine, &path, &residual, label)?;
    let mut ctx = CommandContext::new(sender.clone(), label, args, command.descriptor().clone())
        .with_path(Some(path.clone()));
    parse_arguments(engine, &path, tokens, &mut ctx)?;

    Ok(Prepared { path, ctx, permit })
}

// ============================================================================
// Gates
// ============================================================================

/// Sender kind, then root permission.
pub(crate) fn check_root(
    sender: &dyn CommandSender,
    command: &RegisteredCommand,
) -> Result<(), CommandError> {
    let descriptor = command.descriptor();
    if descriptor.is_player_only() && !sender.is_player() {
        debug!(command = %descriptor.name(), "rejected: player-only command");
        return Err(CommandError::SenderKind);
    }
    if let Some(node) = descriptor.permission()
        && !sender.has_permission(node)
    {
        debug!(command = %descriptor.name(), node, "rejected: root permission");
        return Err(CommandError::PermissionDenied);
    }
    Ok(())
}

pub(crate) fn check_path(
    sender: &dyn CommandSender,
    path: &SubcommandPath,
) -> Result<(), CommandError> {
    if let Some(node) = path.permission()
        && !sender.has_permission(node)
    {
        debug!(path = ?path.segments(), node, "rejected: path permission");
        return Err(CommandError::PermissionDenied);
    }
    Ok(())
}

/// Whether `sender` may run `path` at all.
pub(crate) fn may_use(sender: &dyn CommandSender, path: &SubcommandPath) -> bool {
    path.permission().is_none_or(|node| sender.has_permission(node))
}

/// `/label <a|b c>` over the visible paths the sender may use.
fn subcommand_usage(sender: &dyn CommandSender, command: &RegisteredCommand, label: &str) -> String {
    let names: Vec<String> = command
        .paths()
        .iter()
        .filter(|p| !p.is_default() && !p.is_hidden() && may_use(sender, p))
        .map(|p| p.segments().join(" "))
        .collect();
    if names.is_empty() {
        format!("/{label}")
    } else {
        format!("/{label} <{}>", names.join("|"))
    }
}

// ============================================================================
// Cooldown
// ============================================================================

/// Window and whether the sender skips it.
pub(super) fn cooldown_window(
    engine: &CommandEngine,
    sender: &dyn CommandSender,
    path: &SubcommandPath,
) -> Option<Duration> {
    let window = path.cooldown().window()?;
    let bypass = path
        .cooldown()
        .bypass_permission
        .as_deref()
        .unwrap_or(&engine.inner.config.cooldown.bypass_permission);
    if sender.has_permission(bypass) {
        debug!(node = bypass, "cooldown bypassed");
        return None;
    }
    Some(window)
}

fn reserve_cooldown(
    engine: &CommandEngine,
    sender: &dyn CommandSender,
    command: &RegisteredCommand,
    path: &SubcommandPath,
) -> Result<Option<CooldownPermit>, CommandError> {
    let Some(window) = cooldown_window(engine, sender, path) else {
        return Ok(None);
    };
    engine
        .inner
        .cooldowns
        .try_acquire(sender.id(), &path.qualified_name(command.name()), window)
        .map(Some)
        .map_err(|remaining| CommandError::CooldownActive { remaining })
}

// ============================================================================
// Arguments
// ============================================================================

/// Assign residual tokens to parameters positionally.
///
/// `None` marks an absent optional parameter without a default.
fn assign_tokens(
    engine: &CommandEngine,
    path: &SubcommandPath,
    residual: &[String],
    label: &str,
) -> Result<Vec<Option<String>>, CommandError> {
    let params = path.params();
    let mut tokens = Vec::with_capacity(params.len());
    let mut absorbed = false;

    for (i, spec) in params.iter().enumerate() {
        let greedy = spec.is_greedy()
            || engine
                .inner
                .parsers
                .lookup(spec.type_key())
                .is_ok_and(|p| p.is_greedy());

        if let Some(token) = residual.get(i) {
            if greedy && i + 1 == params.len() {
                tokens.push(Some(residual[i..].join(" ")));
                absorbed = true;
            } else {
                tokens.push(Some(token.clone()));
            }
            continue;
        }

        if spec.is_required() {
            return Err(CommandError::Arity {
                problem: ArityProblem::TooFew {
                    missing: spec.name().to_string(),
                },
                usage: path.usage(label),
            });
        }
        tokens.push(spec.default_value().map(str::to_string));
    }

    if !absorbed && residual.len() > params.len() {
        return Err(CommandError::Arity {
            problem: ArityProblem::TooMany {
                extra: residual.len() - params.len(),
            },
            usage: path.usage(label),
        });
    }
    Ok(tokens)
}

/// Parse and validate in declaration order, stopping at the first failure.
fn parse_arguments(
    engine: &CommandEngine,
    path: &SubcommandPath,
    tokens: Vec<Option<String>>,
    ctx: &mut CommandContext,
) -> Result<(), CommandError> {
    for (spec, token) in path.params().iter().zip(tokens) {
        let Some(token) = token else {
            continue;
        };

        let parser = engine
            .inner
            .parsers
            .lookup(spec.type_key())
            .map_err(|err| CommandError::Handler(HandlerError::Internal(err.into())))?;

        let value = parser.parse_value(ctx, &token).map_err(|err| {
            let message = if err.message().is_empty() {
                parser.error_message().to_string()
            } else {
                err.message().to_string()
            };
            CommandError::Parse {
                parameter: spec.name().to_string(),
                token: token.clone(),
                message,
                suggestions: err.suggestions().to_vec(),
            }
        })?;

        let validation = |message: String| CommandError::Validation {
            parameter: spec.name().to_string(),
            token: token.clone(),
            message,
        };

        parser.validate_value(&value, ctx).map_err(|err| {
            let message = if err.message().is_empty() {
                parser.error_message().to_string()
            } else {
                err.message().to_string()
            };
            validation(message)
        })?;
        for constraint in spec.constraints() {
            constraint.check(&value, &token, ctx).map_err(&validation)?;
        }

        ctx.insert_value(spec.name(), value);
    }
    Ok(())
}

// ============================================================================
// Completion and reporting
// ============================================================================

/// Settle the cooldown reservation and build the result of an invocation.
fn finish(
    engine: &CommandEngine,
    sender: &dyn CommandSender,
    root: &str,
    permit: Option<CooldownPermit>,
    result: HandlerResult,
) -> CommandResult {
    match result {
        Ok(()) => {
            if let Some(permit) = permit {
                permit.commit();
            }
            CommandResult::success()
        }
        Err(err) => {
            drop(permit);
            report(engine, sender, root, CommandError::Handler(err))
        }
    }
}

/// Turn a pipeline error into a user message, a metric and a log line.
pub(super) fn report(
    engine: &CommandEngine,
    sender: &dyn CommandSender,
    root: &str,
    err: CommandError,
) -> CommandResult {
    let message = user_message(engine, &err);
    let kind = err.kind();

    match &err {
        CommandError::Handler(HandlerError::Failed(reason)) => {
            warn!(command = %root, sender = %sender.name(), reason = %reason, "Handler failed");
        }
        CommandError::Handler(inner) => {
            error!(command = %root, sender = %sender.name(), error = %inner, "Handler error");
        }
        other => {
            debug!(command = %root, error = %other, code = kind.code(), "Dispatch rejected");
        }
    }

    metrics::record_command_error(root, kind.code());
    sender.send_message(&message);
    CommandResult::from_error(&err, message)
}

fn user_message(engine: &CommandEngine, err: &CommandError) -> String {
    let messages = &engine.inner.config.messages;
    match err {
        CommandError::UnknownCommand(command) => {
            render(&messages.unknown_command, &[("command", command.as_str())])
        }
        CommandError::UnknownSubcommand { command, usage } => render(
            &messages.unknown_subcommand,
            &[("command", command.as_str()), ("usage", usage.as_str())],
        ),
        CommandError::SenderKind => messages.player_only.clone(),
        CommandError::PermissionDenied => messages.no_permission.clone(),
        CommandError::CooldownActive { remaining } => {
            let remaining = format_duration(*remaining);
            render(&messages.cooldown, &[("remaining", remaining.as_str())])
        }
        CommandError::Arity { problem, usage } => {
            let template = match problem {
                ArityProblem::TooFew { .. } => &messages.too_few_arguments,
                ArityProblem::TooMany { .. } => &messages.too_many_arguments,
            };
            render(template, &[("usage", usage.as_str())])
        }
        CommandError::Parse {
            parameter,
            token,
            message,
            ..
        }
        | CommandError::Validation {
            parameter,
            token,
            message,
        } => render(
            &messages.invalid_argument,
            &[
                ("parameter", parameter.as_str()),
                ("token", token.as_str()),
                ("message", message.as_str()),
            ],
        ),
        CommandError::Handler(HandlerError::Failed(reason)) => reason.clone(),
        CommandError::Handler(_) => messages.handler_failure.clone(),
    }
}
