//! User-facing message templates.
//!
//! Templates use `{name}` placeholders that the dispatch pipeline fills in:
//! `{command}`, `{usage}`, `{remaining}`, `{parameter}`, `{token}`, `{message}`.

use serde::Deserialize;

use super::defaults::{
    default_cooldown, default_handler_failure, default_invalid_argument, default_no_permission,
    default_player_only, default_too_few_arguments, default_too_many_arguments,
    default_unknown_command, default_unknown_subcommand,
};

/// Message templates sent to senders when a dispatch fails.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_unknown_command")]
    pub unknown_command: String,
    #[serde(default = "default_unknown_subcommand")]
    pub unknown_subcommand: String,
    #[serde(default = "default_player_only")]
    pub player_only: String,
    /// Shared by root and subcommand permission denials.
    #[serde(default = "default_no_permission")]
    pub no_permission: String,
    #[serde(default = "default_cooldown")]
    pub cooldown: String,
    #[serde(default = "default_too_few_arguments")]
    pub too_few_arguments: String,
    #[serde(default = "default_too_many_arguments")]
    pub too_many_arguments: String,
    /// Used for both parse and validation failures.
    #[serde(default = "default_invalid_argument")]
    pub invalid_argument: String,
    /// Shown for internal handler errors; details only go to the log.
    #[serde(default = "default_handler_failure")]
    pub handler_failure: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            unknown_command: default_unknown_command(),
            unknown_subcommand: default_unknown_subcommand(),
            player_only: default_player_only(),
            no_permission: default_no_permission(),
            cooldown: default_cooldown(),
            too_few_arguments: default_too_few_arguments(),
            too_many_arguments: default_too_many_arguments(),
            invalid_argument: default_invalid_argument(),
            handler_failure: default_handler_failure(),
        }
    }
}

impl MessagesConfig {
    /// Iterate over `(key, template)` pairs, used by validation.
    pub(crate) fn templates(&self) -> [(&'static str, &str); 9] {
        [
            ("unknown_command", self.unknown_command.as_str()),
            ("unknown_subcommand", self.unknown_subcommand.as_str()),
            ("player_only", self.player_only.as_str()),
            ("no_permission", self.no_permission.as_str()),
            ("cooldown", self.cooldown.as_str()),
            ("too_few_arguments", self.too_few_arguments.as_str()),
            ("too_many_arguments", self.too_many_arguments.as_str()),
            ("invalid_argument", self.invalid_argument.as_str()),
            ("handler_failure", self.handler_failure.as_str()),
        ]
    }
}

/// Fill `{key}` placeholders in a template.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
