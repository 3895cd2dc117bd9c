//! Structured dispatch results.

use super::PendingResult;
use crate::error::{CommandError, ErrorKind};
use std::time::Duration;

/// Final, structured report of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` on success.
    pub kind: Option<ErrorKind>,
    /// User-facing message sent to the sender, if any.
    pub message: Option<String>,
    pub parameter: Option<String>,
    pub token: Option<String>,
    pub suggestions: Vec<String>,
    /// Time left on the cooldown for `CooldownActive` failures.
    pub remaining: Option<Duration>,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            kind: None,
            message: None,
            parameter: None,
            token: None,
            suggestions: Vec::new(),
            remaining: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: Some(message.into()),
            ..Self::success()
        }
    }

    /// Failure report for `error`, carrying `message` as the user text.
    pub fn from_error(error: &CommandError, message: String) -> Self {
        let mut result = Self::failure(error.kind(), message);
        result.parameter = error.parameter().map(str::to_string);
        result.token = error.token().map(str::to_string);
        match error {
            CommandError::Parse { suggestions, .. } => {
                result.suggestions = suggestions.clone();
            }
            CommandError::CooldownActive { remaining } => {
                result.remaining = Some(*remaining);
            }
            _ => {}
        }
        result
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_none()
    }

    /// Whether the handler ran and failed, as opposed to a gate rejecting.
    pub fn is_handler_failure(&self) -> bool {
        self.kind == Some(ErrorKind::Handler)
    }
}

/// What a dispatch produced.
#[derive(Debug)]
pub enum Outcome {
    /// The pipeline finished on the calling task.
    Completed(CommandResult),
    /// An asynchronous handler is still running.
    Pending(PendingResult),
}

impl Outcome {
    /// Wait for the final result.
    pub async fn wait(self) -> CommandResult {
        match self {
            Self::Completed(result) => result,
            Self::Pending(pending) => pending.await,
        }
    }

    /// The result, if already available.
    pub fn completed(&self) -> Option<&CommandResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_carry_details() {
        let err = CommandError::Parse {
            parameter: "amount".into(),
            token: "ten".into(),
            message: "Invalid number".into(),
            suggestions: vec!["10".into()],
        };
        let result = CommandResult::from_error(&err, "bad".into());
        assert_eq!(result.kind, Some(ErrorKind::Parse));
        assert_eq!(result.parameter.as_deref(), Some("amount"));
        assert_eq!(result.token.as_deref(), Some("ten"));
        assert_eq!(result.suggestions, ["10"]);
        assert!(!result.is_success());
    }

    #[test]
    fn cooldown_errors_carry_remaining() {
        let err = CommandError::CooldownActive {
            remaining: Duration::from_secs(3),
        };
        let result = CommandResult::from_error(&err, "wait".into());
        assert_eq!(result.remaining, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn completed_outcome_waits_immediately() {
        let outcome = Outcome::Completed(CommandResult::success());
        assert!(outcome.completed().is_some());
        assert!(outcome.wait().await.is_success());
    }
}
