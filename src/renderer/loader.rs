//! Filesystem lookup of namespaced template names

use crate::paths::{Namespace, TemplatePath};
use log::trace;
use minijinja::{Error, ErrorKind};
use std::path::{Component, Path, PathBuf};

/// Loads templates from namespaced directories.
///
/// `@admin/users/list.html.twig` is looked up in the directories of the
/// `admin` namespace, any other name in the default namespace. Within a
/// namespace the first directory containing the file wins.
#[derive(Debug, Clone, Default)]
pub struct NamespacedLoader {
    paths: Vec<TemplatePath>,
}

impl NamespacedLoader {
    pub fn new(paths: Vec<TemplatePath>) -> Self {
        Self { paths }
    }

    /// Finds the file backing the template called `name`.
    ///
    /// # Errors
    /// * `ErrorKind::InvalidOperation` for names escaping their directory
    pub fn find(&self, name: &str) -> Result<Option<PathBuf>, Error> {
        let (namespace, relative) = split_name(name);
        let relative = safe_relative_path(relative).ok_or_else(|| {
            Error::new(ErrorKind::InvalidOperation, format!("invalid template name '{name}'"))
        })?;

        let found = self
            .paths
            .iter()
            .filter(|path| path.namespace == namespace)
            .map(|path| path.path.join(&relative))
            .find(|candidate| candidate.is_file());
        trace!("Template '{name}' resolved to {found:?}");
        Ok(found)
    }

    /// Reads the source of the template called `name`, `None` when missing.
    pub fn load(&self, name: &str) -> Result<Option<String>, Error> {
        let Some(path) = self.find(name)? else {
            return Ok(None);
        };
        std::fs::read_to_string(&path).map(Some).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template '{}'", path.display()),
            )
            .with_source(e)
        })
    }
}

/// Splits `@namespace/rest` into its namespace and relative name.
fn split_name(name: &str) -> (Namespace, &str) {
    if let Some(qualified) = name.strip_prefix('@') {
        if let Some((namespace, rest)) = qualified.split_once('/') {
            return (Namespace::Named(namespace.to_string()), rest);
        }
    }
    (Namespace::Default, name)
}

/// Rejects absolute names and parent-directory segments.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn splits_namespaced_names() {
        assert_eq!(
            split_name("@admin/users/list.html"),
            (Namespace::Named("admin".into()), "users/list.html")
        );
        assert_eq!(split_name("layout.html"), (Namespace::Default, "layout.html"));
        assert_eq!(split_name("@broken"), (Namespace::Default, "@broken"));
    }

    #[test]
    fn first_directory_in_namespace_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("page.html"), "first").unwrap();
        fs::write(second.path().join("page.html"), "second").unwrap();
        fs::write(second.path().join("only.html"), "only").unwrap();

        let loader = NamespacedLoader::new(vec![
            TemplatePath::new(first.path(), Namespace::Default),
            TemplatePath::new(second.path(), Namespace::Default),
        ]);

        assert_eq!(loader.load("page.html").unwrap().as_deref(), Some("first"));
        assert_eq!(loader.load("only.html").unwrap().as_deref(), Some("only"));
        assert_eq!(loader.load("missing.html").unwrap(), None);
    }

    #[test]
    fn namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "admin page").unwrap();
        let loader =
            NamespacedLoader::new(vec![TemplatePath::new(dir.path(), Namespace::Named("admin".into()))]);

        assert_eq!(loader.load("@admin/page.html").unwrap().as_deref(), Some("admin page"));
        assert_eq!(loader.load("page.html").unwrap(), None);
        assert_eq!(loader.load("@other/page.html").unwrap(), None);
    }

    #[test]
    fn rejects_escaping_names() {
        let loader = NamespacedLoader::new(vec![TemplatePath::new("/tmp", Namespace::Default)]);
        assert!(loader.load("../etc/passwd").is_err());
        assert!(loader.load("/etc/passwd").is_err());
        assert!(loader.load("@ns/../../secret").is_err());
    }
}
