//! Boolean parser.

use super::{ArgumentParser, ParseError};
use crate::completion::CompletionContext;
use crate::dispatch::CommandContext;

const TRUE_WORDS: &[&str] = &["true", "yes", "on", "1", "enable", "enabled", "y"];
const FALSE_WORDS: &[&str] = &["false", "no", "off", "0", "disable", "disabled", "n"];
const SUGGESTIONS: [&str; 4] = ["true", "false", "yes", "no"];

/// Parses booleans from a fixed, case-insensitive word table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanParser;

impl ArgumentParser for BooleanParser {
    type Output = bool;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<bool, ParseError> {
        let lower = token.to_ascii_lowercase();
        if TRUE_WORDS.contains(&lower.as_str()) {
            Ok(true)
        } else if FALSE_WORDS.contains(&lower.as_str()) {
            Ok(false)
        } else {
            Err(ParseError::new(self.error_message(), token).with_suggestions(SUGGESTIONS))
        }
    }

    fn suggest(&self, _ctx: &CompletionContext) -> Vec<String> {
        SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }

    fn error_message(&self) -> &str {
        "Expected true or false"
    }
}
