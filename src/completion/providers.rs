//! Named completion providers.

use super::CompletionContext;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A dynamic source of completion candidates, referenced by key from
/// parameter specs.
pub trait CompletionProvider: Send + Sync + 'static {
    fn complete(&self, ctx: &CompletionContext) -> Vec<String>;

    /// Whether the engine filters candidates by the typed prefix. Providers
    /// doing their own matching (fuzzy, substring) return `false`.
    fn filter_by_prefix(&self) -> bool {
        true
    }
}

/// Adapter for closures.
pub struct FnProvider<F>(F);

pub fn provider_fn<F>(f: F) -> FnProvider<F>
where
    F: Fn(&CompletionContext) -> Vec<String> + Send + Sync + 'static,
{
    FnProvider(f)
}

impl<F> CompletionProvider for FnProvider<F>
where
    F: Fn(&CompletionContext) -> Vec<String> + Send + Sync + 'static,
{
    fn complete(&self, ctx: &CompletionContext) -> Vec<String> {
        (self.0)(ctx)
    }
}

/// Providers keyed by case-insensitive name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn CompletionProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `provider` to `key`. Returns `true` if a binding was replaced.
    pub fn register<P: CompletionProvider>(&self, key: &str, provider: P) -> bool {
        let replaced = self
            .providers
            .write()
            .insert(key.to_lowercase(), Arc::new(provider))
            .is_some();
        debug!(key, replaced, "Registered completion provider");
        replaced
    }

    pub fn unregister(&self, key: &str) -> bool {
        self.providers.write().remove(&key.to_lowercase()).is_some()
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn CompletionProvider>> {
        self.providers.read().get(&key.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::testing;

    #[test]
    fn keys_are_case_insensitive() {
        let registry = ProviderRegistry::new();
        assert!(!registry.register("Warps", provider_fn(|_| vec!["spawn".into()])));
        assert!(registry.register("warps", provider_fn(|_| vec!["arena".into()])));
        assert_eq!(registry.len(), 1);

        let provider = registry.get("WARPS").unwrap();
        assert_eq!(provider.complete(&testing::completion("")), ["arena"]);
        assert!(provider.filter_by_prefix());

        assert!(registry.unregister("warps"));
        assert!(registry.is_empty());
    }
}
