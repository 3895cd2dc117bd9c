//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("completion.max_suggestions must be greater than zero when set")]
    ZeroMaxSuggestions,
    #[error("cooldown.bypass_permission must not be empty")]
    EmptyBypassPermission,
    #[error("cooldown.bypass_permission must not contain whitespace, got '{0}'")]
    InvalidBypassPermission(String),
    #[error("messages.{0} must not be empty")]
    EmptyMessage(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.completion.max_suggestions == Some(0) {
        errors.push(ValidationError::ZeroMaxSuggestions);
    }

    let bypass = &config.cooldown.bypass_permission;
    if bypass.is_empty() {
        errors.push(ValidationError::EmptyBypassPermission);
    } else if bypass.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidBypassPermission(bypass.clone()));
    }

    for (key, template) in config.messages.templates() {
        if template.trim().is_empty() {
            errors.push(ValidationError::EmptyMessage(key));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_suggestions_fails() {
        let config: Config = toml::from_str("[completion]\nmax_suggestions = 0\n").unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroMaxSuggestions)));
    }

    #[test]
    fn test_bad_bypass_permission_fails() {
        let config: Config =
            toml::from_str("[cooldown]\nbypass_permission = \"no cooldown\"\n").unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidBypassPermission(_))));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let toml = r#"
[completion]
max_suggestions = 0

[cooldown]
bypass_permission = ""

[messages]
cooldown = "  "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyMessage("cooldown"))));
    }
}
