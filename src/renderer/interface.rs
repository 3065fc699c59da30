use crate::error::Result;
use crate::paths::{Namespace, TemplatePath};
use std::path::Path;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders the template called `name`.
    ///
    /// # Arguments
    /// * `name` - Template name, either `name`, `@namespace/name` or `namespace::name`
    /// * `params` - Context variables; merged over the default parameters
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template
    fn render(&self, name: &str, params: &serde_json::Value) -> Result<String>;

    /// Adds a template directory, optionally under a namespace.
    ///
    /// Directories added earlier take precedence within a namespace.
    fn add_path(&mut self, path: &Path, namespace: Namespace);

    /// The registered template directories in registration order.
    fn paths(&self) -> &[TemplatePath];

    /// Adds a parameter passed to `template` on every render.
    ///
    /// The template name `*` applies the parameter to every template.
    fn add_default_param(&mut self, template: &str, key: &str, value: serde_json::Value);
}
