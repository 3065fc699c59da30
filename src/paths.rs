//! Template search paths and their namespaces.

use crate::error::{value_kind, Error, Result};
use log::{debug, warn};
use serde_json::Value;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Namespace a template path is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The unnamed namespace, used for templates referenced without a prefix.
    Default,
    /// A named namespace, referenced as `@name/template` or `name::template`.
    Named(String),
}

impl Namespace {
    /// Interprets a configuration mapping key as a namespace.
    ///
    /// Numeric keys (`0`, `1`, `"2"`, `"1.5"`, ...) come from list-style path
    /// declarations and select the default namespace.
    pub fn from_key(key: &str) -> Self {
        if is_numeric_key(key) {
            Namespace::Default
        } else {
            Namespace::Named(key.to_string())
        }
    }

    /// Returns the namespace name, or `None` for the default namespace.
    pub fn name(&self) -> Option<&str> {
        match self {
            Namespace::Default => None,
            Namespace::Named(name) => Some(name),
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Default => write!(f, "(default)"),
            Namespace::Named(name) => write!(f, "{name}"),
        }
    }
}

fn is_numeric_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return false;
    }
    // f64 parsing also accepts "inf" and "NaN", which are not numeric keys.
    key.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && key.chars().any(|c| c.is_ascii_digit())
        && key.parse::<f64>().is_ok()
}

/// A directory searched for templates within a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePath {
    pub path: PathBuf,
    pub namespace: Namespace,
}

impl TemplatePath {
    pub fn new<P: Into<PathBuf>>(path: P, namespace: Namespace) -> Self {
        Self { path: path.into(), namespace }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl Display for TemplatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Namespace::Default => write!(f, "{}", self.path.display()),
            Namespace::Named(name) => write!(f, "@{name}: {}", self.path.display()),
        }
    }
}

/// Flattens a namespace-to-path(s) mapping into ordered template paths.
///
/// Mapping order is preserved, and so is the order of paths listed for a
/// single namespace. A top-level list registers every entry in the default
/// namespace.
///
/// # Errors
/// * `Error::InvalidTemplatePath` if a path entry is not a string
pub fn flatten_paths(paths: &Value) -> Result<Vec<TemplatePath>> {
    let mut flattened = Vec::new();
    match paths {
        Value::Object(map) => {
            for (key, entry) in map {
                push_entry(&mut flattened, Namespace::from_key(key), entry)?;
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                push_entry(&mut flattened, Namespace::Default, entry)?;
            }
        }
        Value::Null => {}
        other => {
            warn!("Ignoring template paths of kind {}", value_kind(other));
        }
    }
    Ok(flattened)
}

fn push_entry(
    flattened: &mut Vec<TemplatePath>,
    namespace: Namespace,
    entry: &Value,
) -> Result<()> {
    match entry {
        Value::Array(items) => {
            for item in items {
                flattened.push(TemplatePath::new(path_str(&namespace, item)?, namespace.clone()));
            }
        }
        single => {
            flattened.push(TemplatePath::new(path_str(&namespace, single)?, namespace.clone()));
        }
    }
    debug!("Registered template paths for namespace {namespace}");
    Ok(())
}

fn path_str<'a>(namespace: &Namespace, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| Error::InvalidTemplatePath {
        namespace: namespace.to_string(),
        kind: value_kind(value).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths_in<'a>(paths: &'a [TemplatePath], namespace: &Namespace) -> Vec<&'a str> {
        paths
            .iter()
            .filter(|p| &p.namespace == namespace)
            .map(|p| p.path.to_str().unwrap())
            .collect()
    }

    #[test]
    fn numeric_keys_select_default_namespace() {
        assert_eq!(Namespace::from_key("0"), Namespace::Default);
        assert_eq!(Namespace::from_key("12"), Namespace::Default);
        assert_eq!(Namespace::from_key("1.5"), Namespace::Default);
        assert_eq!(Namespace::from_key("-1"), Namespace::Default);
        assert_eq!(Namespace::from_key(" 3"), Namespace::Default);
        assert_eq!(Namespace::from_key("1 "), Namespace::Default);
        assert_eq!(Namespace::from_key(" 2 "), Namespace::Default);
        assert_eq!(Namespace::from_key("1e3"), Namespace::Default);
    }

    #[test]
    fn non_numeric_keys_are_named() {
        assert_eq!(Namespace::from_key("foo"), Namespace::Named("foo".into()));
        assert_eq!(Namespace::from_key("1a"), Namespace::Named("1a".into()));
        assert_eq!(Namespace::from_key("inf"), Namespace::Named("inf".into()));
        assert_eq!(Namespace::from_key("NaN"), Namespace::Named("NaN".into()));
        assert_eq!(Namespace::from_key("e"), Namespace::Named("e".into()));
        assert_eq!(Namespace::from_key(""), Namespace::Named("".into()));
    }

    #[test]
    fn flattens_mixed_namespaces_in_order() {
        let paths = flatten_paths(&json!({
            "foo": "/a",
            "1": "/b",
            "bar": ["/c", "/d"],
            "0": ["/e", "/f"],
        }))
        .unwrap();

        let foo = Namespace::Named("foo".into());
        let bar = Namespace::Named("bar".into());
        assert_eq!(paths.len(), 6);
        assert_eq!(paths_in(&paths, &foo), vec!["/a"]);
        assert_eq!(paths_in(&paths, &bar), vec!["/c", "/d"]);
        assert_eq!(paths_in(&paths, &Namespace::Default), vec!["/b", "/e", "/f"]);
        assert_eq!(paths[0], TemplatePath::new("/a", foo));
    }

    #[test]
    fn list_of_paths_uses_default_namespace() {
        let paths = flatten_paths(&json!(["/one", "/two"])).unwrap();
        assert_eq!(paths_in(&paths, &Namespace::Default), vec!["/one", "/two"]);
    }

    #[test]
    fn missing_or_scalar_paths_yield_nothing() {
        assert!(flatten_paths(&json!(null)).unwrap().is_empty());
        assert!(flatten_paths(&json!("not-a-mapping")).unwrap().is_empty());
        assert!(flatten_paths(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_string_paths() {
        let err = flatten_paths(&json!({"foo": ["/a", 3]})).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTemplatePath { ref namespace, ref kind }
                if namespace == "foo" && kind == "integer"
        ));
    }

    #[test]
    fn displays_namespaced_paths() {
        let named = TemplatePath::new("/views", Namespace::Named("admin".into()));
        assert_eq!(named.to_string(), "@admin: /views");
        assert_eq!(TemplatePath::new("/views", Namespace::Default).to_string(), "/views");
    }
}
