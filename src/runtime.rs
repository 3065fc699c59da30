//! Lazy providers of extension runtime helpers.

use indexmap::IndexMap;
use minijinja::Value;
use std::sync::Arc;

/// Resolves a runtime name to a helper value on first use.
///
/// Loaders are consulted in registration order; the first one returning
/// `Some` wins.
pub trait RuntimeLoader: Send + Sync {
    fn load(&self, name: &str) -> Option<Value>;
}

type RuntimeFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// A runtime loader backed by a map of factories.
#[derive(Clone, Default)]
pub struct FactoryRuntimeLoader {
    factories: IndexMap<String, RuntimeFactory>,
}

impl FactoryRuntimeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory producing the runtime called `name`.
    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }
}

impl RuntimeLoader for FactoryRuntimeLoader {
    fn load(&self, name: &str) -> Option<Value> {
        self.factories.get(name).map(|factory| factory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_registered_runtimes_only() {
        let loader = FactoryRuntimeLoader::new()
            .with_factory("Markdown", || Value::from("markdown-runtime"));

        assert_eq!(loader.load("Markdown"), Some(Value::from("markdown-runtime")));
        assert_eq!(loader.load("Missing"), None);
    }
}
