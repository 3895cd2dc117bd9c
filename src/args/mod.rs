//! Argument parsers and the type-keyed parser registry.
//!
//! An [`ArgumentParser`] converts one raw token (or, for greedy parsers, the
//! space-joined remainder of the input) into a typed value, validates it, and
//! offers completion candidates. Parsers are registered per output type in a
//! [`ParserRegistry`] and shared read-only across all dispatches, so they must
//! not keep per-call state; cross-parser state goes through the context's
//! extension map instead.
//!
//! ## Built-in parsers
//!
//! | Output | Parser |
//! |---|---|
//! | `i32`, `i64` | [`IntegerParser`] |
//! | `f32`, `f64` | [`DoubleParser`] |
//! | `bool` | [`BooleanParser`] |
//! | `std::time::Duration` | [`DurationParser`] |
//! | `String` | [`StringParser`] |
//! | [`Text`] | [`TextParser`] (greedy) |

mod boolean;
mod duration;
mod numeric;
mod registry;
mod selector;
mod text;

pub use boolean::BooleanParser;
pub use duration::{DurationParser, format_duration, parse_duration};
pub use numeric::{Decimal, DoubleParser, IntegerParser};
pub use registry::{NotRegisteredError, ParserRegistry};
pub use selector::{SelectorResolver, WithSelectors};
pub use text::{ChoiceParser, StringParser, Text, TextParser};

use crate::completion::CompletionContext;
use crate::dispatch::CommandContext;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A parsed, type-erased argument value.
pub type ArgValue = Arc<dyn Any + Send + Sync>;

// ============================================================================
// Parse errors
// ============================================================================

/// A parser rejected a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    token: String,
    suggestions: Vec<String>,
}

impl ParseError {
    /// Create an error with an explicit message.
    pub fn new(message: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token: token.into(),
            suggestions: Vec::new(),
        }
    }

    /// Create an error that uses the parser's [`ArgumentParser::error_message`].
    pub fn invalid(token: impl Into<String>) -> Self {
        Self::new(String::new(), token)
    }

    /// Attach suggested corrections.
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

// ============================================================================
// Type keys
// ============================================================================

/// Identifies the target type of a parameter.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether range constraints make sense for this type.
    pub fn is_numeric(&self) -> bool {
        [
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<isize>(),
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<usize>(),
            TypeId::of::<f32>(),
            TypeId::of::<f64>(),
            TypeId::of::<Duration>(),
        ]
        .contains(&self.id)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Numeric view of a parsed value, used by range constraints.
///
/// Durations compare in seconds.
pub fn numeric_value(value: &ArgValue) -> Option<f64> {
    let v: &(dyn Any + Send + Sync) = &**value;
    macro_rules! try_as {
        ($($t:ty),*) => {
            $(
                if let Some(n) = v.downcast_ref::<$t>() {
                    return Some(*n as f64);
                }
            )*
        };
    }
    try_as!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
    v.downcast_ref::<Duration>().map(Duration::as_secs_f64)
}

// ============================================================================
// Parser traits
// ============================================================================

/// Converts raw tokens into one target type.
///
/// Implementations are shared across threads and dispatches and must be
/// free of per-call mutable state.
pub trait ArgumentParser: Send + Sync + 'static {
    /// The type this parser produces; also the registry key.
    type Output: Any + Send + Sync;

    /// Convert one token (or the joined remainder, when greedy).
    fn parse(&self, ctx: &mut CommandContext, token: &str) -> Result<Self::Output, ParseError>;

    /// Completion candidates. Recomputed for every request.
    fn suggest(&self, _ctx: &CompletionContext) -> Vec<String> {
        Vec::new()
    }

    /// Whether this parser consumes every remaining token.
    fn is_greedy(&self) -> bool {
        false
    }

    /// Message used when [`parse`](Self::parse) fails without its own message.
    fn error_message(&self) -> &str {
        "Invalid value"
    }

    /// Check a successfully parsed value. Runs strictly after `parse`.
    fn validate(&self, _value: &Self::Output, _ctx: &CommandContext) -> Result<(), ParseError> {
        Ok(())
    }

    /// Accept selector tokens in addition to what this parser accepts.
    fn with_selectors<S>(self, selectors: S) -> WithSelectors<Self, S>
    where
        Self: Sized,
        S: SelectorResolver<Self::Output>,
    {
        WithSelectors::new(self, selectors)
    }
}

/// Object-safe view of an [`ArgumentParser`], as stored in the registry.
pub trait AnyParser: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn parse_value(&self, ctx: &mut CommandContext, token: &str) -> Result<ArgValue, ParseError>;
    fn validate_value(&self, value: &ArgValue, ctx: &CommandContext) -> Result<(), ParseError>;
    fn suggest(&self, ctx: &CompletionContext) -> Vec<String>;
    fn is_greedy(&self) -> bool;
    fn error_message(&self) -> &str;
}

pub(crate) struct Erased<P>(pub(crate) P);

impl<P: ArgumentParser> AnyParser for Erased<P> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<P::Output>()
    }

    fn parse_value(&self, ctx: &mut CommandContext, token: &str) -> Result<ArgValue, ParseError> {
        let value = self.0.parse(ctx, token)?;
        Ok(Arc::new(value))
    }

    fn validate_value(&self, value: &ArgValue, ctx: &CommandContext) -> Result<(), ParseError> {
        match (**value).downcast_ref::<P::Output>() {
            Some(typed) => self.0.validate(typed, ctx),
            None => Err(ParseError::new(
                format!("expected a value of type {}", self.type_name()),
                "",
            )),
        }
    }

    fn suggest(&self, ctx: &CompletionContext) -> Vec<String> {
        self.0.suggest(ctx)
    }

    fn is_greedy(&self) -> bool {
        self.0.is_greedy()
    }

    fn error_message(&self) -> &str {
        self.0.error_message()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for parser unit tests.

    use crate::completion::CompletionContext;
    use crate::dispatch::CommandContext;
    use crate::sender::{CommandSender, SenderId};
    use crate::tree::CommandDescriptor;
    use std::sync::Arc;

    pub struct QuietSender;

    impl CommandSender for QuietSender {
        fn id(&self) -> SenderId {
            SenderId::Console
        }
        fn name(&self) -> &str {
            "console"
        }
        fn has_permission(&self, _node: &str) -> bool {
            true
        }
        fn send_message(&self, _text: &str) {}
    }

    pub fn context() -> CommandContext {
        let descriptor = CommandDescriptor::builder("test").build().unwrap();
        CommandContext::new(Arc::new(QuietSender), "test", Vec::new(), Arc::new(descriptor))
    }

    pub fn completion(partial: &str) -> CompletionContext {
        CompletionContext::new(Arc::new(QuietSender), "test", Vec::new(), partial, 0)
    }
}
