//! String, greedy-text and fixed-choice parsers.

use super::{ArgumentParser, ParseError};
use crate::completion::CompletionContext;
use crate::dispatch::CommandContext;
use std::fmt;
use std::ops::Deref;

/// Parser for a single whitespace-free token.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl ArgumentParser for StringParser {
    type Output = String;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<String, ParseError> {
        Ok(token.to_string())
    }
}

/// Free text that absorbs the rest of the input.
///
/// Inner runs of whitespace are normalized to single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Text(pub String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Text> for String {
    fn from(text: Text) -> Self {
        text.0
    }
}

/// Greedy parser producing [`Text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl ArgumentParser for TextParser {
    type Output = Text;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<Text, ParseError> {
        Ok(Text(token.to_string()))
    }

    fn is_greedy(&self) -> bool {
        true
    }
}

/// Maps a fixed set of case-insensitive names to values.
///
/// ```ignore
/// let mode = ChoiceParser::new("mode")
///     .choice("fast", Mode::Fast)
///     .choice("safe", Mode::Safe);
/// registry.register(mode);
/// ```
#[derive(Debug, Clone)]
pub struct ChoiceParser<T> {
    label: String,
    choices: Vec<(String, T)>,
}

impl<T: Clone + Send + Sync + 'static> ChoiceParser<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            choices: Vec::new(),
        }
    }

    /// Add a named choice. Later duplicates of a name are ignored.
    pub fn choice(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        if !self.choices.iter().any(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            self.choices.push((name, value));
        }
        self
    }

    fn names(&self) -> Vec<String> {
        self.choices.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl<T: Clone + Send + Sync + 'static> ArgumentParser for ChoiceParser<T> {
    type Output = T;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<T, ParseError> {
        self.choices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                ParseError::new(format!("Unknown {}", self.label), token)
                    .with_suggestions(self.names())
            })
    }

    fn suggest(&self, _ctx: &CompletionContext) -> Vec<String> {
        self.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::testing;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Fast,
        Safe,
    }

    fn modes() -> ChoiceParser<Mode> {
        ChoiceParser::new("mode")
            .choice("fast", Mode::Fast)
            .choice("safe", Mode::Safe)
            .choice("FAST", Mode::Safe)
    }

    #[test]
    fn string_parser_keeps_token() {
        let mut ctx = testing::context();
        assert_eq!(StringParser.parse(&mut ctx, "Alice").unwrap(), "Alice");
        assert!(!StringParser.is_greedy());
    }

    #[test]
    fn text_parser_is_greedy() {
        let mut ctx = testing::context();
        let text = TextParser.parse(&mut ctx, "hello there world").unwrap();
        assert_eq!(text.as_str(), "hello there world");
        assert!(TextParser.is_greedy());
    }

    #[test]
    fn choice_is_case_insensitive() {
        let mut ctx = testing::context();
        assert_eq!(modes().parse(&mut ctx, "Fast").unwrap(), Mode::Fast);
        assert_eq!(modes().parse(&mut ctx, "SAFE").unwrap(), Mode::Safe);
    }

    #[test]
    fn unknown_choice_lists_names() {
        let mut ctx = testing::context();
        let err = modes().parse(&mut ctx, "slow").unwrap_err();
        assert_eq!(err.message(), "Unknown mode");
        assert_eq!(err.suggestions(), ["fast", "safe"]);
        assert_eq!(modes().suggest(&testing::completion("")), ["fast", "safe"]);
    }
}
