//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Cooldown Defaults
// =============================================================================

pub fn default_bypass_permission() -> String {
    "slcmd.cooldown.bypass".to_string()
}

pub fn default_sweep_interval() -> u64 {
    300
}

// =============================================================================
// Message Defaults
// =============================================================================

pub fn default_unknown_command() -> String {
    "Unknown command: {command}".to_string()
}

pub fn default_unknown_subcommand() -> String {
    "Unknown subcommand. Usage: {usage}".to_string()
}

pub fn default_player_only() -> String {
    "Only players can use this command.".to_string()
}

pub fn default_no_permission() -> String {
    "You do not have permission to use this command.".to_string()
}

pub fn default_cooldown() -> String {
    "You must wait {remaining} before using this command again.".to_string()
}

pub fn default_too_few_arguments() -> String {
    "Not enough arguments. Usage: {usage}".to_string()
}

pub fn default_too_many_arguments() -> String {
    "Too many arguments. Usage: {usage}".to_string()
}

pub fn default_invalid_argument() -> String {
    "Invalid value '{token}' for {parameter}: {message}".to_string()
}

pub fn default_handler_failure() -> String {
    "An internal error occurred while running this command.".to_string()
}
