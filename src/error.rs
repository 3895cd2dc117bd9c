//! Unified error handling for slcmd.
//!
//! This module provides the error hierarchy for command routing: registration
//! errors raised while building the command tree, the pipeline taxonomy
//! produced by a dispatch, and handler errors returned by command bodies.
//! Every pipeline error maps to a static [`ErrorKind`] used for metric labels.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error kinds (metric labels)
// ============================================================================

/// Classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownCommand,
    UnknownSubcommand,
    SenderKind,
    PermissionDenied,
    CooldownActive,
    Arity,
    Parse,
    Validation,
    Handler,
}

impl ErrorKind {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown_command",
            Self::UnknownSubcommand => "unknown_subcommand",
            Self::SenderKind => "sender_kind",
            Self::PermissionDenied => "permission_denied",
            Self::CooldownActive => "cooldown_active",
            Self::Arity => "arity",
            Self::Parse => "parse_failure",
            Self::Validation => "validation_failure",
            Self::Handler => "handler_error",
        }
    }

    /// Whether the error was raised before the handler ran.
    pub fn is_pre_invocation(&self) -> bool {
        !matches!(self, Self::Handler)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Pipeline errors (dispatch)
// ============================================================================

/// What was wrong with the number of argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArityProblem {
    /// A required parameter had no token and no default.
    TooFew { missing: String },
    /// More tokens than parameters and no greedy parameter to absorb them.
    TooMany { extra: usize },
}

impl fmt::Display for ArityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFew { missing } => write!(f, "missing argument <{missing}>"),
            Self::TooMany { extra } => write!(f, "{extra} unexpected argument(s)"),
        }
    }
}

/// Errors that can occur while dispatching one command invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown subcommand for /{command}")]
    UnknownSubcommand { command: String, usage: String },

    #[error("command requires a player sender")]
    SenderKind,

    /// Deliberately carries no detail about which check failed.
    #[error("permission denied")]
    PermissionDenied,

    #[error("cooldown active: {}ms remaining", .remaining.as_millis())]
    CooldownActive { remaining: Duration },

    #[error("{problem} (usage: {usage})")]
    Arity { problem: ArityProblem, usage: String },

    #[error("invalid value {token:?} for {parameter}: {message}")]
    Parse {
        parameter: String,
        token: String,
        message: String,
        suggestions: Vec<String>,
    },

    #[error("invalid value {token:?} for {parameter}: {message}")]
    Validation {
        parameter: String,
        token: String,
        message: String,
    },

    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),
}

impl CommandError {
    /// The metric/telemetry classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Self::UnknownSubcommand { .. } => ErrorKind::UnknownSubcommand,
            Self::SenderKind => ErrorKind::SenderKind,
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::CooldownActive { .. } => ErrorKind::CooldownActive,
            Self::Arity { .. } => ErrorKind::Arity,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Handler(_) => ErrorKind::Handler,
        }
    }

    /// Parameter name for argument errors.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Parse { parameter, .. } | Self::Validation { parameter, .. } => Some(parameter),
            Self::Arity {
                problem: ArityProblem::TooFew { missing },
                ..
            } => Some(missing),
            _ => None,
        }
    }

    /// Offending raw token for argument errors.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Parse { token, .. } | Self::Validation { token, .. } => Some(token),
            _ => None,
        }
    }
}

// ============================================================================
// Handler errors (command bodies)
// ============================================================================

/// Errors returned by command handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A deliberate, user-facing failure. The message is shown to the sender.
    #[error("{0}")]
    Failed(String),

    /// An unexpected failure. Logged in full, shown to the sender generically.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    /// The scheduled task was dropped or panicked before producing a result.
    #[error("handler task did not complete")]
    Aborted,
}

impl HandlerError {
    /// Convenience constructor for [`HandlerError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Registration errors (tree construction)
// ============================================================================

/// Errors raised while building descriptors or registering commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid command or segment name: {0:?}")]
    InvalidName(String),

    #[error("command name or alias '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("duplicate subcommand path '{path}' under /{command}")]
    DuplicatePath { command: String, path: String },

    #[error("greedy parameter '{parameter}' must be the last parameter of '{path}'")]
    GreedyNotLast { path: String, parameter: String },

    #[error("required parameter '{parameter}' follows an optional parameter in '{path}'")]
    RequiredAfterOptional { path: String, parameter: String },

    #[error("parameter '{parameter}' is declared twice in '{path}'")]
    DuplicateParameter { path: String, parameter: String },

    #[error("range constraint on non-numeric parameter '{parameter}' ({type_name})")]
    RangeOnNonNumeric {
        parameter: String,
        type_name: &'static str,
    },
}
