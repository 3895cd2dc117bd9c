//! Telemetry utilities for command timing and span construction.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors for command observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Create a span for one command dispatch.
    pub fn command(label: &str, sender: &str) -> Span {
        info_span!("command", label = %label, sender = %sender)
    }

    /// Create a span for an asynchronous handler running on the scheduler.
    pub fn handler_task(command: &str, sender: &str) -> Span {
        info_span!("handler_task", command = %command, sender = %sender)
    }

    /// Create a span for a completion request.
    pub fn completion(label: &str, sender: &str) -> Span {
        debug_span!("completion", label = %label, sender = %sender)
    }
}
