//! Type-keyed parser registry.
//!
//! One parser per output type. Registering a parser for a type that already
//! has one replaces the binding; dispatches already holding the previous
//! parser keep using it until they finish.

use super::{
    AnyParser, ArgumentParser, BooleanParser, DoubleParser, DurationParser, Erased,
    IntegerParser, StringParser, TextParser, TypeKey,
};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// No parser is bound to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no argument parser registered for {type_name}")]
pub struct NotRegisteredError {
    pub type_name: &'static str,
}

/// Registry of argument parsers keyed by their output type.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: RwLock<HashMap<TypeId, Arc<dyn AnyParser>>>,
}

impl ParserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in parsers bound.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(IntegerParser::<i32>::new());
        registry.register(IntegerParser::<i64>::new());
        registry.register(DoubleParser::<f32>::new());
        registry.register(DoubleParser::<f64>::new());
        registry.register(BooleanParser);
        registry.register(DurationParser);
        registry.register(StringParser);
        registry.register(TextParser);
        registry
    }

    /// Bind `parser` to its output type. Returns `true` if a previous binding
    /// was replaced.
    pub fn register<P: ArgumentParser>(&self, parser: P) -> bool {
        let key = TypeKey::of::<P::Output>();
        let replaced = self
            .parsers
            .write()
            .insert(key.id(), Arc::new(Erased(parser)))
            .is_some();
        debug!(target_type = key.name(), replaced, "Registered argument parser");
        replaced
    }

    /// Parser bound to `T`.
    pub fn get<T: Any>(&self) -> Result<Arc<dyn AnyParser>, NotRegisteredError> {
        self.lookup(TypeKey::of::<T>())
    }

    /// Parser bound to the type identified by `key`.
    pub fn lookup(&self, key: TypeKey) -> Result<Arc<dyn AnyParser>, NotRegisteredError> {
        self.parsers
            .read()
            .get(&key.id())
            .cloned()
            .ok_or(NotRegisteredError {
                type_name: key.name(),
            })
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.parsers.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.parsers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.read().is_empty()
    }
}

#[cfg(test)]
fn builtin_types() -> [TypeKey; 8] {
    use super::Text;
    use std::time::Duration;

    [
        TypeKey::of::<i32>(),
        TypeKey::of::<i64>(),
        TypeKey::of::<f32>(),
        TypeKey::of::<f64>(),
        TypeKey::of::<bool>(),
        TypeKey::of::<Duration>(),
        TypeKey::of::<String>(),
        TypeKey::of::<Text>(),
    ]
}
