use super::loader::NamespacedLoader;
use crate::constants::TEMPLATE_ALL;
use crate::environment::TemplateEnvironment;
use crate::error::{value_kind, Error, Result};
use crate::paths::{Namespace, TemplatePath};
use crate::renderer::interface::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

/// MiniJinja-based template renderer loading templates from namespaced
/// directories.
pub struct MiniJinjaRenderer {
    /// Configured environment the templates are rendered with
    environment: TemplateEnvironment,
    /// Suffix appended to template names without a file extension
    suffix: String,
    paths: Vec<TemplatePath>,
    /// Default parameters per normalized template name
    default_params: IndexMap<String, Map<String, Value>>,
}

impl MiniJinjaRenderer {
    pub fn new(environment: TemplateEnvironment, suffix: impl Into<String>) -> Self {
        let mut renderer = Self {
            environment,
            suffix: suffix.into(),
            paths: Vec::new(),
            default_params: IndexMap::new(),
        };
        renderer.install_loader();
        renderer
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn environment(&self) -> &TemplateEnvironment {
        &self.environment
    }

    /// Turns `ns::name` into `@ns/name` and appends the suffix when the name
    /// has no file extension.
    pub fn normalize_name(&self, name: &str) -> String {
        let name = match name.split_once("::") {
            Some((namespace, rest)) if !namespace.is_empty() && !namespace.contains(':') => {
                format!("@{namespace}/{rest}")
            }
            _ => name.to_string(),
        };
        if has_file_extension(&name) {
            name
        } else {
            format!("{name}.{}", self.suffix)
        }
    }

    /// Adds a template directory from configuration.
    pub fn add_template_path(&mut self, path: TemplatePath) {
        debug!("Adding template path {path}");
        self.paths.push(path);
        self.install_loader();
    }

    fn install_loader(&mut self) {
        let loader = NamespacedLoader::new(self.paths.clone());
        let env = self.environment.minijinja_mut();
        env.set_loader(move |name| loader.load(name));
        env.clear_templates();
    }

    /// Merges the defaults for every template, then those for `name`, then
    /// `params`; later values win and nested objects merge recursively.
    fn merge_params(&self, name: &str, params: &Value) -> Result<Value> {
        let mut merged = Map::new();
        for key in [TEMPLATE_ALL, name] {
            if let Some(defaults) = self.default_params.get(key) {
                merge_recursive(&mut merged, defaults);
            }
        }
        match params {
            Value::Object(params) => merge_recursive(&mut merged, params),
            Value::Null => {}
            other => return Err(Error::InvalidParamsKind { kind: value_kind(other).to_string() }),
        }
        Ok(Value::Object(merged))
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, params: &Value) -> Result<String> {
        let name = self.normalize_name(name);
        let context = self.merge_params(&name, params)?;
        debug!("Rendering template '{name}'");

        if self.environment.is_auto_reload() {
            let mut env = self.environment.minijinja().clone();
            env.clear_templates();
            return Ok(env.get_template(&name)?.render(&context)?);
        }
        Ok(self.environment.minijinja().get_template(&name)?.render(&context)?)
    }

    fn add_path(&mut self, path: &Path, namespace: Namespace) {
        self.add_template_path(TemplatePath::new(path, namespace));
    }

    fn paths(&self) -> &[TemplatePath] {
        &self.paths
    }

    fn add_default_param(&mut self, template: &str, key: &str, value: Value) {
        let template = if template == TEMPLATE_ALL {
            TEMPLATE_ALL.to_string()
        } else {
            self.normalize_name(template)
        };
        self.default_params.entry(template).or_default().insert(key.to_string(), value);
    }
}

/// Whether `name` ends in a dot followed by ASCII letters.
fn has_file_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, extension)| {
        !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphabetic())
    })
}

fn merge_recursive(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (target.get_mut(key), value)
        {
            merge_recursive(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}
