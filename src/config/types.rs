//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{default_bypass_permission, default_sweep_interval};
use super::messages::MessagesConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Completion engine limits.
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Cooldown tracker policy.
    #[serde(default)]
    pub cooldown: CooldownConfig,
    /// User-facing message templates.
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Completion engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionConfig {
    /// Maximum suggestions returned per request (default: unlimited).
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

/// Cooldown configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CooldownConfig {
    /// Permission node that skips every cooldown unless a command names its own.
    #[serde(default = "default_bypass_permission")]
    pub bypass_permission: String,
    /// Seconds between sweeps of elapsed cooldown entries (0 disables the sweep).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            bypass_permission: default_bypass_permission(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CooldownConfig {
    /// Sweep interval, `None` when sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.completion.max_suggestions, None);
        assert_eq!(config.cooldown.bypass_permission, "slcmd.cooldown.bypass");
        assert_eq!(config.cooldown.sweep_interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_sweep_interval_disables_sweep() {
        let config: Config = toml::from_str("[cooldown]\nsweep_interval_secs = 0\n").unwrap();
        assert_eq!(config.cooldown.sweep_interval(), None);
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[completion]
max_suggestions = 20

[cooldown]
bypass_permission = "admin.nocooldown"

[messages]
no_permission = "Denied."
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.completion.max_suggestions, Some(20));
        assert_eq!(config.cooldown.bypass_permission, "admin.nocooldown");
        assert_eq!(config.messages.no_permission, "Denied.");
        // Untouched templates keep their defaults.
        assert_eq!(config.messages.unknown_command, "Unknown command: {command}");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/slcmd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[completion\nmax_suggestions = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
