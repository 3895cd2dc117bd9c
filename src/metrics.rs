//! Prometheus metrics collection for slcmd.
//!
//! ## Command Routing Metrics
//!
//! - `slcmd_command_total{command}` - Commands dispatched
//! - `slcmd_command_duration_seconds{command}` - Dispatch latency histogram
//! - `slcmd_command_errors_total{command, error}` - Failures by error kind
//! - `slcmd_completions_total{command}` - Completion requests served
//! - `slcmd_registered_commands` - Root commands currently registered
//!
//! The host decides how metrics are exposed; [`gather_metrics`] renders the
//! registry in Prometheus text format.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Commands dispatched (successful or not).
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by command and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Completion requests by command.
pub static COMPLETIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms / Gauges
// ========================================================================

/// End-to-end dispatch latency by command.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Root commands registered in the command tree.
pub static REGISTERED_COMMANDS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Recording before `init` is a silent no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("slcmd_command_total", "Commands dispatched"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("slcmd_command_errors_total", "Command failures by error kind"), &["command", "error"]));
    register!(COMPLETIONS, IntCounterVec::new(Opts::new("slcmd_completions_total", "Completion requests served"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("slcmd_command_duration_seconds", "Command dispatch latency")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(REGISTERED_COMMANDS, IntGauge::new("slcmd_registered_commands", "Root commands registered"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a dispatched command with its latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record a completion request.
#[inline]
pub fn record_completion(command: &str) {
    if let Some(c) = COMPLETIONS.get() {
        c.with_label_values(&[command]).inc();
    }
}

/// Update the registered root command gauge.
#[inline]
pub fn set_registered_commands(count: usize) {
    if let Some(g) = REGISTERED_COMMANDS.get() {
        g.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_command("team", 0.001);
        record_command_error("team", "parse_failure");
        record_completion("team");
        set_registered_commands(3);

        let output = gather_metrics();
        assert!(output.contains("slcmd_command_total"));
        assert!(output.contains("slcmd_command_errors_total"));
        assert!(output.contains("parse_failure"));
    }
}
