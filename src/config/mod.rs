//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, CompletionConfig, CooldownConfig)
//! - [`messages`]: User-facing message templates (MessagesConfig)
//! - [`validation`]: Startup validation of a loaded configuration

mod defaults;
mod messages;
mod types;
mod validation;

pub use messages::{MessagesConfig, render};
pub use types::{CompletionConfig, Config, ConfigError, CooldownConfig};
pub use validation::{ValidationError, validate};
