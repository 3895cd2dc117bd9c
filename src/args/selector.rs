//! Selector tokens layered over an ordinary parser.
//!
//! A selector is a token such as `@p` or `@s` that stands for a value
//! computed from the invocation rather than spelled out literally. The
//! resolver decides which tokens are selectors; everything else falls through
//! to the wrapped parser.

use super::{ArgumentParser, ParseError};
use crate::completion::CompletionContext;
use crate::dispatch::CommandContext;

/// Resolves selector tokens to values of `T`.
pub trait SelectorResolver<T>: Send + Sync + 'static {
    /// Whether `token` is a selector handled by this resolver.
    fn is_selector(&self, token: &str) -> bool;

    /// Resolve a selector token.
    fn resolve(&self, ctx: &mut CommandContext, token: &str) -> Result<T, ParseError>;

    /// Selector spellings offered during completion.
    fn selectors(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A parser that accepts selectors in addition to its base grammar.
pub struct WithSelectors<P, S> {
    base: P,
    selectors: S,
}

impl<P, S> WithSelectors<P, S> {
    pub fn new(base: P, selectors: S) -> Self {
        Self { base, selectors }
    }
}

impl<P, S> ArgumentParser for WithSelectors<P, S>
where
    P: ArgumentParser,
    S: SelectorResolver<P::Output>,
{
    type Output = P::Output;

    fn parse(&self, ctx: &mut CommandContext, token: &str) -> Result<P::Output, ParseError> {
        if self.selectors.is_selector(token) {
            self.selectors.resolve(ctx, token)
        } else {
            self.base.parse(ctx, token)
        }
    }

    fn suggest(&self, ctx: &CompletionContext) -> Vec<String> {
        let mut out = self.selectors.selectors();
        out.extend(self.base.suggest(ctx));
        out
    }

    fn is_greedy(&self) -> bool {
        self.base.is_greedy()
    }

    fn error_message(&self) -> &str {
        self.base.error_message()
    }

    fn validate(&self, value: &P::Output, ctx: &CommandContext) -> Result<(), ParseError> {
        self.base.validate(value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{IntegerParser, testing};

    /// `@max` resolves to a fixed ceiling; `@last` reads a value an earlier
    /// parser left in the context.
    struct Limits;

    impl SelectorResolver<i32> for Limits {
        fn is_selector(&self, token: &str) -> bool {
            token.starts_with('@')
        }

        fn resolve(&self, ctx: &mut CommandContext, token: &str) -> Result<i32, ParseError> {
            match token {
                "@max" => Ok(100),
                "@last" => ctx
                    .extension::<i32>()
                    .copied()
                    .ok_or_else(|| ParseError::new("No previous value", token)),
                _ => Err(ParseError::new("Unknown selector", token)),
            }
        }

        fn selectors(&self) -> Vec<String> {
            vec!["@max".into(), "@last".into()]
        }
    }

    #[test]
    fn selector_tokens_bypass_base_parser() {
        let parser = IntegerParser::<i32>::new().with_selectors(Limits);
        let mut ctx = testing::context();
        assert_eq!(parser.parse(&mut ctx, "@max").unwrap(), 100);
        assert_eq!(parser.parse(&mut ctx, "7").unwrap(), 7);
        assert!(parser.parse(&mut ctx, "@nope").is_err());
        assert!(parser.parse(&mut ctx, "@last").is_err());

        ctx.put_extension(5_i32);
        assert_eq!(parser.parse(&mut ctx, "@last").unwrap(), 5);
    }

    #[test]
    fn selectors_lead_suggestions() {
        let parser = IntegerParser::<i32>::new().with_selectors(Limits);
        let suggestions = parser.suggest(&testing::completion(""));
        assert_eq!(&suggestions[..2], ["@max", "@last"]);
    }
}
