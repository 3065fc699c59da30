//! Resolution of extension and runtime-loader references.
//!
//! A reference is either a ready instance or the name of a service to look up.
//! References read from raw configuration can also be of an unsupported kind;
//! those are kept as-is and rejected during resolution so the error can name
//! what was actually configured.

use crate::container::{Service, ServiceLocator};
use crate::error::{value_kind, Error, Result};
use crate::extension::Extension;
use crate::runtime::RuntimeLoader;
use log::debug;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Reference to an extension or runtime loader.
pub enum Reference<T: ?Sized> {
    /// A live instance
    Instance(Arc<T>),
    /// A service key resolved through a [`ServiceLocator`]
    Service(String),
    /// Any other configured value
    Unsupported(Value),
}

impl<T: ?Sized> Reference<T> {
    /// Builds a reference from a raw configuration entry.
    pub fn from_config(value: &Value) -> Self {
        match value {
            Value::String(key) => Reference::Service(key.clone()),
            other => Reference::Unsupported(other.clone()),
        }
    }

    /// Builds references from a raw configuration list; a non-list value is
    /// treated as a single entry.
    pub fn list_from_config(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_config).collect(),
            Value::Null => Vec::new(),
            other => vec![Self::from_config(other)],
        }
    }
}

impl<T: ?Sized> Clone for Reference<T> {
    fn clone(&self) -> Self {
        match self {
            Reference::Instance(instance) => Reference::Instance(Arc::clone(instance)),
            Reference::Service(key) => Reference::Service(key.clone()),
            Reference::Unsupported(value) => Reference::Unsupported(value.clone()),
        }
    }
}

impl<T: ?Sized> Debug for Reference<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Instance(_) => write!(f, "Instance(..)"),
            Reference::Service(key) => f.debug_tuple("Service").field(key).finish(),
            Reference::Unsupported(value) => f.debug_tuple("Unsupported").field(value).finish(),
        }
    }
}

impl From<Arc<dyn Extension>> for Reference<dyn Extension> {
    fn from(extension: Arc<dyn Extension>) -> Self {
        Reference::Instance(extension)
    }
}

impl From<Arc<dyn RuntimeLoader>> for Reference<dyn RuntimeLoader> {
    fn from(loader: Arc<dyn RuntimeLoader>) -> Self {
        Reference::Instance(loader)
    }
}

/// Per-kind knobs for [`resolve`].
struct Resolution<T: ?Sized> {
    what: &'static str,
    extract: fn(Service) -> std::result::Result<Arc<T>, Service>,
    invalid: fn(String) -> Error,
    unresolvable: fn(String) -> Error,
}

fn resolve<T: ?Sized>(
    refs: &[Reference<T>],
    locator: &dyn ServiceLocator,
    resolution: Resolution<T>,
) -> Result<Vec<Arc<T>>> {
    refs.iter()
        .map(|reference| match reference {
            Reference::Instance(instance) => Ok(Arc::clone(instance)),
            Reference::Service(key) => {
                debug!("Resolving {} service '{key}'", resolution.what);
                let service = locator
                    .get(key)
                    .ok_or_else(|| (resolution.unresolvable)(key.clone()))?;
                (resolution.extract)(service)
                    .map_err(|other| (resolution.invalid)(other.kind().to_string()))
            }
            Reference::Unsupported(value) => {
                Err((resolution.invalid)(value_kind(value).to_string()))
            }
        })
        .collect()
}

/// Resolves extension references in order.
///
/// # Errors
/// * `Error::UnresolvableReference` if a service key is not registered
/// * `Error::InvalidExtensionKind` if a reference or its service is not an extension
pub fn resolve_extensions(
    refs: &[Reference<dyn Extension>],
    locator: &dyn ServiceLocator,
) -> Result<Vec<Arc<dyn Extension>>> {
    resolve(
        refs,
        locator,
        Resolution {
            what: "extension",
            extract: |service| match service {
                Service::Extension(extension) => Ok(extension),
                other => Err(other),
            },
            invalid: |kind| Error::InvalidExtensionKind { kind },
            unresolvable: |key| Error::UnresolvableReference { key },
        },
    )
}

/// Resolves runtime-loader references in order.
///
/// # Errors
/// * `Error::UnresolvableRuntimeLoaderReference` if a service key is not registered
/// * `Error::InvalidRuntimeLoaderKind` if a reference or its service is not a runtime loader
pub fn resolve_runtime_loaders(
    refs: &[Reference<dyn RuntimeLoader>],
    locator: &dyn ServiceLocator,
) -> Result<Vec<Arc<dyn RuntimeLoader>>> {
    resolve(
        refs,
        locator,
        Resolution {
            what: "runtime loader",
            extract: |service| match service {
                Service::RuntimeLoader(loader) => Ok(loader),
                other => Err(other),
            },
            invalid: |kind| Error::InvalidRuntimeLoaderKind { kind },
            unresolvable: |key| Error::UnresolvableRuntimeLoaderReference { key },
        },
    )
}
