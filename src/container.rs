//! Service lookup used by the factories.
//!
//! The factories never reach into a global container; they receive a
//! [`ServiceLocator`] and ask it for well-known keys (see
//! [`crate::constants::services`]) or for keys named in configuration.

use crate::environment::TemplateEnvironment;
use crate::extension::{Extension, Router, ServerUrlHelper, UrlHelper};
use crate::runtime::RuntimeLoader;
use indexmap::IndexMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A service registered in a locator.
#[derive(Clone)]
pub enum Service {
    /// Raw application configuration
    Config(serde_json::Value),
    Extension(Arc<dyn Extension>),
    RuntimeLoader(Arc<dyn RuntimeLoader>),
    UrlHelper(Arc<dyn UrlHelper>),
    ServerUrlHelper(Arc<dyn ServerUrlHelper>),
    Router(Arc<dyn Router>),
    /// A fully built template environment
    Environment(TemplateEnvironment),
    /// Any other service, carried as plain data
    Value(serde_json::Value),
}

impl Service {
    /// Short name of the service kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Service::Config(_) => "config",
            Service::Extension(_) => "extension",
            Service::RuntimeLoader(_) => "runtime loader",
            Service::UrlHelper(_) => "url helper",
            Service::ServerUrlHelper(_) => "server url helper",
            Service::Router(_) => "router",
            Service::Environment(_) => "environment",
            Service::Value(value) => crate::error::value_kind(value),
        }
    }
}

impl Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Config(value) => f.debug_tuple("Config").field(value).finish(),
            Service::Extension(ext) => f.debug_tuple("Extension").field(&ext.name()).finish(),
            Service::Value(value) => f.debug_tuple("Value").field(value).finish(),
            other => write!(f, "Service({})", other.kind()),
        }
    }
}

/// Trait for resolving services by key.
pub trait ServiceLocator {
    /// Returns the service registered under `key`, if any.
    fn get(&self, key: &str) -> Option<Service>;

    /// Whether a service is registered under `key`.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory service locator preserving registration order.
#[derive(Debug, Clone, Default)]
pub struct Container {
    services: IndexMap<String, Service>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service, replacing any previous one with the same key.
    pub fn set<K: Into<String>>(&mut self, key: K, service: Service) -> &mut Self {
        self.services.insert(key.into(), service);
        self
    }

    /// Builder-style variant of [`Container::set`].
    pub fn with<K: Into<String>>(mut self, key: K, service: Service) -> Self {
        self.set(key, service);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

impl ServiceLocator for Container {
    fn get(&self, key: &str) -> Option<Service> {
        self.services.get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }
}
