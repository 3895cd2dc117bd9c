//! Parameter specifications.

use crate::args::{ArgValue, Text, TypeKey, numeric_value};
use crate::dispatch::CommandContext;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Whether a parameter must be supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Optional; when absent the default token (if any) is parsed instead.
    Optional(Option<String>),
}

/// Where completion candidates for a parameter come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionSource {
    /// The bound parser's `suggest`.
    Parser,
    /// A fixed list.
    Static(Vec<String>),
    /// A named provider in the provider registry.
    Provider(String),
}

type CustomCheck = Arc<dyn Fn(&ArgValue, &CommandContext) -> Result<(), String> + Send + Sync>;

/// Checks applied after the parser's own validation.
#[derive(Clone)]
pub enum Constraint {
    Range { min: Option<f64>, max: Option<f64> },
    NonEmpty,
    Custom(CustomCheck),
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::NonEmpty => f.write_str("NonEmpty"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Constraint {
    /// Check a parsed value. `token` is the raw input it came from.
    pub fn check(&self, value: &ArgValue, token: &str, ctx: &CommandContext) -> Result<(), String> {
        match self {
            Self::Range { min, max } => {
                let Some(n) = numeric_value(value) else {
                    return Ok(());
                };
                if let Some(min) = min
                    && n < *min
                {
                    return Err(format!("Value must be at least {min}"));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(format!("Value must be at most {max}"));
                }
                Ok(())
            }
            Self::NonEmpty => {
                let empty = if let Some(s) = value.downcast_ref::<String>() {
                    s.trim().is_empty()
                } else if let Some(t) = value.downcast_ref::<Text>() {
                    t.trim().is_empty()
                } else {
                    token.trim().is_empty()
                };
                if empty {
                    Err("Value cannot be empty".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Custom(check) => check(value, ctx),
        }
    }
}

/// One declared parameter of a subcommand path.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    type_key: TypeKey,
    presence: Presence,
    greedy: bool,
    completion: CompletionSource,
    constraints: Vec<Constraint>,
}

impl ParameterSpec {
    /// A required parameter whose value has type `T`.
    ///
    /// [`Text`] parameters start out greedy.
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_key: TypeKey::of::<T>(),
            presence: Presence::Required,
            greedy: TypeId::of::<T>() == TypeId::of::<Text>(),
            completion: CompletionSource::Parser,
            constraints: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        if self.presence == Presence::Required {
            self.presence = Presence::Optional(None);
        }
        self
    }

    /// Optional, parsing `token` when the parameter is absent.
    pub fn default_token(mut self, token: impl Into<String>) -> Self {
        self.presence = Presence::Optional(Some(token.into()));
        self
    }

    /// Absorb every remaining token, joined by single spaces.
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    pub fn suggestions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completion = CompletionSource::Static(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn provider(mut self, key: impl Into<String>) -> Self {
        self.completion = CompletionSource::Provider(key.into());
        self
    }

    pub fn min(self, min: f64) -> Self {
        self.with_range(Some(min), None)
    }

    pub fn max(self, max: f64) -> Self {
        self.with_range(None, Some(max))
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.with_range(Some(min), Some(max))
    }

    fn with_range(mut self, new_min: Option<f64>, new_max: Option<f64>) -> Self {
        for constraint in &mut self.constraints {
            if let Constraint::Range { min, max } = constraint {
                *min = new_min.or(*min);
                *max = new_max.or(*max);
                return self;
            }
        }
        self.constraints.push(Constraint::Range {
            min: new_min,
            max: new_max,
        });
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.constraints.push(Constraint::NonEmpty);
        self
    }

    /// Custom predicate over the typed value. Values of any other type pass.
    pub fn check<T, F>(mut self, predicate: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, &CommandContext) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constraints
            .push(Constraint::Custom(Arc::new(move |value: &ArgValue, ctx: &CommandContext| {
                match value.downcast_ref::<T>() {
                    Some(typed) => predicate(typed, ctx),
                    None => Ok(()),
                }
            })));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    pub fn default_value(&self) -> Option<&str> {
        match &self.presence {
            Presence::Optional(Some(token)) => Some(token),
            _ => None,
        }
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn completion(&self) -> &CompletionSource {
        &self.completion
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn has_range(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Range { .. }))
    }

    /// Usage fragment: `<name>`, `[name]` or `<name...>`.
    pub fn usage(&self) -> String {
        let dots = if self.greedy { "..." } else { "" };
        if self.is_required() {
            format!("<{}{dots}>", self.name)
        } else {
            format!("[{}{dots}]", self.name)
        }
    }
}
