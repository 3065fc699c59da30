//! Merging of the raw configuration into normalized settings

use crate::config::types::{Autoescape, Optimizations};
use crate::constants::{keys, services, DEFAULT_TEMPLATE_EXTENSION};
use crate::container::{Service, ServiceLocator};
use crate::error::{value_kind, Error, Result};
use crate::extension::Extension;
use crate::paths::{flatten_paths, TemplatePath};
use crate::resolver::Reference;
use crate::runtime::RuntimeLoader;
use chrono_tz::Tz;
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Normalized renderer settings.
///
/// `timezone`, `autoescape` and `optimizations` are kept as configured and
/// validated by their accessors when the environment is built.
#[derive(Debug, Clone)]
pub struct Settings {
    pub debug: bool,
    pub extension: String,
    pub cache_dir: Option<PathBuf>,
    pub assets_url: String,
    pub assets_version: String,
    pub extensions: Vec<Reference<dyn Extension>>,
    pub runtime_loaders: Vec<Reference<dyn RuntimeLoader>>,
    pub globals: IndexMap<String, Value>,
    pub paths: Vec<TemplatePath>,
    timezone: Option<Value>,
    autoescape: Option<Value>,
    optimizations: Option<Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            cache_dir: None,
            assets_url: String::new(),
            assets_version: String::new(),
            extensions: Vec::new(),
            runtime_loaders: Vec::new(),
            globals: IndexMap::new(),
            paths: Vec::new(),
            timezone: None,
            autoescape: None,
            optimizations: None,
        }
    }
}

impl Settings {
    /// The configured timezone, if any.
    ///
    /// # Errors
    /// * `Error::InvalidTimezoneKind` if the value is not a string
    /// * `Error::UnknownTimezone` if the string names no known zone
    pub fn timezone(&self) -> Result<Option<Tz>> {
        let Some(value) = &self.timezone else {
            return Ok(None);
        };
        let name = value
            .as_str()
            .ok_or_else(|| Error::InvalidTimezoneKind { kind: value_kind(value).to_string() })?;
        name.parse::<Tz>()
            .map(Some)
            .map_err(|_| Error::UnknownTimezone { timezone: name.to_string() })
    }

    /// The configured escaping strategy, if any.
    pub fn autoescape(&self) -> Result<Option<Autoescape>> {
        self.autoescape.as_ref().map(Autoescape::from_config).transpose()
    }

    /// The configured optimizer bitmask, if any.
    pub fn optimizations(&self) -> Result<Option<Optimizations>> {
        self.optimizations.as_ref().map(Optimizations::from_config).transpose()
    }
}

/// Merges the legacy `templates` section and the current `twig` section.
///
/// Keys of the `twig` section take precedence. Every key is replaced as a
/// whole except `globals` and `paths`, which are merged key by key.
///
/// # Errors
/// * `Error::InvalidConfigKind` if `raw` is not an object
/// * `Error::InvalidTemplatePath` if a configured path is not a string
pub fn merge_config(raw: &Value) -> Result<Settings> {
    let root = raw
        .as_object()
        .ok_or_else(|| Error::InvalidConfigKind { kind: value_kind(raw).to_string() })?;

    let mut merged = Map::new();
    let mut globals = Map::new();
    let mut paths = Map::new();

    for section_name in [keys::TEMPLATES, keys::TWIG] {
        let Some(section) = root.get(section_name) else {
            continue;
        };
        let Some(section) = section.as_object() else {
            warn!("Ignoring '{section_name}' configuration of kind {}", value_kind(section));
            continue;
        };
        debug!("Merging '{section_name}' configuration section");

        for (key, value) in section {
            match key.as_str() {
                keys::GLOBALS => overlay(&mut globals, key, value),
                keys::PATHS => match value {
                    // A list declares default-namespace paths under positional keys.
                    Value::Array(items) => {
                        for (index, item) in items.iter().enumerate() {
                            paths.insert(index.to_string(), item.clone());
                        }
                    }
                    other => overlay(&mut paths, key, other),
                },
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let mut settings = Settings {
        debug: root.get(keys::DEBUG).map(is_truthy).unwrap_or(false),
        ..Settings::default()
    };

    if let Some(extension) = string_setting(&merged, keys::EXTENSION) {
        settings.extension = extension;
    }
    if let Some(assets_url) = string_setting(&merged, keys::ASSETS_URL) {
        settings.assets_url = assets_url;
    }
    if let Some(assets_version) = string_setting(&merged, keys::ASSETS_VERSION) {
        settings.assets_version = assets_version;
    }
    settings.cache_dir = match merged.get(keys::CACHE_DIR) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(dir)) => Some(PathBuf::from(dir)),
        Some(other) => {
            warn!("Ignoring '{}' of kind {}", keys::CACHE_DIR, value_kind(other));
            None
        }
    };
    if let Some(extensions) = merged.get(keys::EXTENSIONS) {
        settings.extensions = Reference::list_from_config(extensions);
    }
    if let Some(loaders) = merged.get(keys::RUNTIME_LOADERS) {
        settings.runtime_loaders = Reference::list_from_config(loaders);
    }
    settings.globals = globals.into_iter().collect();
    settings.timezone = merged.get(keys::TIMEZONE).cloned();
    settings.autoescape = merged.get(keys::AUTOESCAPE).cloned();
    settings.optimizations = merged.get(keys::OPTIMIZATIONS).cloned();

    settings.paths = flatten_paths(&Value::Object(paths))?;

    Ok(settings)
}

/// Merges the `config` service of `locator`, or empty configuration when
/// none is registered.
pub fn settings_from_locator(locator: &dyn ServiceLocator) -> Result<Settings> {
    match locator.get(services::CONFIG) {
        Some(Service::Config(config)) | Some(Service::Value(config)) => merge_config(&config),
        Some(other) => Err(Error::InvalidConfigKind { kind: other.kind().to_string() }),
        None => {
            debug!("No '{}' service registered; using defaults", services::CONFIG);
            merge_config(&Value::Object(Map::new()))
        }
    }
}

/// Replaces `target` entries with those of `value` when it is an object.
fn overlay(target: &mut Map<String, Value>, key: &str, value: &Value) {
    match value {
        Value::Object(entries) => {
            for (name, entry) in entries {
                target.insert(name.clone(), entry.clone());
            }
        }
        Value::Null => {}
        other => warn!("Ignoring '{key}' of kind {}", value_kind(other)),
    }
}

fn string_setting(merged: &Map<String, Value>, key: &str) -> Option<String> {
    match merged.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => {
            warn!("Ignoring '{key}' of kind {}", value_kind(other));
            None
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}
