use crate::config::{Autoescape, Optimizations};
use crate::error::{Error, Result};
use crate::extension::{DateTimeExtension, Extension};
use crate::runtime::RuntimeLoader;
use chrono_tz::Tz;
use indexmap::IndexMap;
use log::debug;
use minijinja::value::Rest;
use minijinja::{AutoEscape, Environment, State, UndefinedBehavior, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Engine switches derived from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOptions {
    pub debug: bool,
    /// Undefined variables raise errors instead of rendering empty.
    pub strict_variables: bool,
    /// Templates are reloaded from disk on every render.
    pub auto_reload: bool,
    /// Directory for compiled templates; `None` disables caching.
    pub cache: Option<PathBuf>,
}

impl EnvironmentOptions {
    /// Development mode turns on strictness and reloading and never caches.
    pub fn new(debug: bool, cache_dir: Option<PathBuf>) -> Self {
        Self {
            debug,
            strict_variables: debug,
            auto_reload: debug,
            cache: if debug { None } else { cache_dir },
        }
    }
}

/// A configured minijinja environment.
///
/// Besides the engine itself it keeps track of the registered extensions,
/// the runtime loaders and the engine options that minijinja does not
/// model directly (timezone, escaping strategy, optimizer bitmask).
#[derive(Clone)]
pub struct TemplateEnvironment {
    env: Environment<'static>,
    options: EnvironmentOptions,
    extensions: IndexMap<String, Arc<dyn Extension>>,
    runtime_loaders: Vec<Arc<dyn RuntimeLoader>>,
    runtimes: Arc<Mutex<HashMap<String, Value>>>,
    globals: IndexMap<String, serde_json::Value>,
    timezone: Tz,
    autoescape: Autoescape,
    optimizations: Optimizations,
}

impl TemplateEnvironment {
    pub fn new(options: EnvironmentOptions) -> Self {
        let mut env = Environment::new();
        env.set_debug(options.debug);
        env.set_undefined_behavior(if options.strict_variables {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });

        let mut environment = Self {
            env,
            options,
            extensions: IndexMap::new(),
            runtime_loaders: Vec::new(),
            runtimes: Arc::new(Mutex::new(HashMap::new())),
            globals: IndexMap::new(),
            timezone: chrono_tz::UTC,
            autoescape: Autoescape::default(),
            optimizations: Optimizations::default(),
        };
        environment.set_autoescape(Autoescape::default());
        environment.add_extension(Arc::new(DateTimeExtension::default()));
        environment
    }

    /// Registers an extension's functions and filters.
    ///
    /// An extension with the same name as a registered one replaces it,
    /// including the functions and filters only the old one provided.
    pub fn add_extension(&mut self, extension: Arc<dyn Extension>) {
        debug!("Registering template extension '{}'", extension.name());
        if let Some(replaced) = self.extensions.get(extension.name()).cloned() {
            for function in replaced.functions() {
                self.env.remove_global(function.name());
            }
            for filter in replaced.filters() {
                self.env.remove_filter(filter.name());
            }
        }
        for function in extension.functions() {
            self.env.add_global(function.name().to_string(), function.callable().clone());
        }
        for filter in extension.filters() {
            let callable = filter.callable().clone();
            self.env.add_filter(
                filter.name().to_string(),
                move |state: &State, args: Rest<Value>| callable.call(state, &args),
            );
        }
        self.extensions.insert(extension.name().to_string(), extension);
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    pub fn extension(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.extensions.get(name)
    }

    /// Names of the registered extensions in registration order.
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    pub fn add_runtime_loader(&mut self, loader: Arc<dyn RuntimeLoader>) {
        self.runtime_loaders.push(loader);
    }

    /// Returns the runtime called `name`.
    ///
    /// Loaders are asked in registration order and the first answer is
    /// cached for later lookups.
    ///
    /// # Errors
    /// * `Error::RuntimeNotFound` if no loader provides the runtime
    pub fn runtime(&self, name: &str) -> Result<Value> {
        if let Some(runtime) = self.runtimes.lock().ok().and_then(|cache| cache.get(name).cloned()) {
            return Ok(runtime);
        }

        let runtime = self
            .runtime_loaders
            .iter()
            .find_map(|loader| loader.load(name))
            .ok_or_else(|| Error::RuntimeNotFound { name: name.to_string() })?;

        if let Ok(mut cache) = self.runtimes.lock() {
            cache.insert(name.to_string(), runtime.clone());
        }
        Ok(runtime)
    }

    /// Makes `value` available to every template under `name`.
    pub fn add_global(&mut self, name: impl Into<String>, value: serde_json::Value) {
        let name = name.into();
        self.env.add_global(name.clone(), Value::from_serialize(&value));
        self.globals.insert(name, value);
    }

    pub fn globals(&self) -> &IndexMap<String, serde_json::Value> {
        &self.globals
    }

    /// Sets the timezone used by the `date` filter and `now` function.
    pub fn set_timezone(&mut self, timezone: Tz) {
        self.timezone = timezone;
        self.add_extension(Arc::new(DateTimeExtension::new(timezone)));
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn set_autoescape(&mut self, autoescape: Autoescape) {
        self.autoescape = autoescape;
        self.env.set_auto_escape_callback(move |name| autoescape.for_template(name));
    }

    pub fn autoescape(&self) -> Autoescape {
        self.autoescape
    }

    /// The escaping applied to the template called `name`.
    pub fn escaping_strategy(&self, name: &str) -> AutoEscape {
        self.autoescape.for_template(name)
    }

    pub fn set_optimizations(&mut self, optimizations: Optimizations) {
        self.optimizations = optimizations;
    }

    pub fn optimizations(&self) -> Optimizations {
        self.optimizations
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    pub fn is_debug(&self) -> bool {
        self.options.debug
    }

    pub fn is_strict_variables(&self) -> bool {
        self.options.strict_variables
    }

    pub fn is_auto_reload(&self) -> bool {
        self.options.auto_reload
    }

    pub fn cache(&self) -> Option<&Path> {
        self.options.cache.as_deref()
    }

    /// Renders a template source string with the environment's functions,
    /// filters and globals.
    pub fn render_str(&self, source: &str, context: &serde_json::Value) -> Result<String> {
        Ok(self.env.render_str(source, context)?)
    }

    pub fn minijinja(&self) -> &Environment<'static> {
        &self.env
    }

    pub fn minijinja_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for TemplateEnvironment {
    fn default() -> Self {
        Self::new(EnvironmentOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{DebugExtension, TemplateFilter, TemplateFunction};
    use crate::runtime::FactoryRuntimeLoader;
    use serde_json::json;

    struct Greeter(&'static str);

    impl Extension for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn functions(&self) -> Vec<TemplateFunction> {
            let greeting = self.0;
            vec![TemplateFunction::new("greet", move |name: String| format!("{greeting}, {name}"))]
        }

        fn filters(&self) -> Vec<TemplateFilter> {
            vec![TemplateFilter::new("shout", |value: String| value.to_uppercase())]
        }
    }

    #[test]
    fn debug_options_disable_cache() {
        let options = EnvironmentOptions::new(true, Some(PathBuf::from("/tmp/cache")));
        assert!(options.debug && options.strict_variables && options.auto_reload);
        assert_eq!(options.cache, None);

        let options = EnvironmentOptions::new(false, Some(PathBuf::from("/tmp/cache")));
        assert!(!options.debug && !options.strict_variables && !options.auto_reload);
        assert_eq!(options.cache, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn defaults() {
        let environment = TemplateEnvironment::default();
        assert_eq!(environment.timezone(), chrono_tz::UTC);
        assert_eq!(environment.autoescape(), Autoescape::Html);
        assert_eq!(environment.optimizations(), Optimizations::ALL);
        assert!(environment.has_extension(DateTimeExtension::NAME));
        assert!(!environment.has_extension(DebugExtension::NAME));
        assert_eq!(environment.cache(), None);
    }

    #[test]
    fn registers_extension_functions_and_filters() {
        let mut environment = TemplateEnvironment::default();
        environment.add_extension(Arc::new(Greeter("Hello")));

        let rendered = environment.render_str("{{ greet('Ada') | shout }}", &json!({})).unwrap();
        assert_eq!(rendered, "HELLO, ADA");
    }

    #[test]
    fn later_extension_with_same_name_wins() {
        let mut environment = TemplateEnvironment::default();
        environment.add_extension(Arc::new(Greeter("Hello")));
        environment.add_extension(Arc::new(Greeter("Bonjour")));

        assert_eq!(environment.extension_names().filter(|n| *n == "greeter").count(), 1);
        let rendered = environment.render_str("{{ greet('Ada') }}", &json!({})).unwrap();
        assert_eq!(rendered, "Bonjour, Ada");
    }

    struct Stamp(bool);

    impl Extension for Stamp {
        fn name(&self) -> &str {
            "stamp"
        }

        fn functions(&self) -> Vec<TemplateFunction> {
            let mut functions = vec![TemplateFunction::new("stamp", || "stamped")];
            if self.0 {
                functions.push(TemplateFunction::new("legacy_stamp", || "legacy"));
            }
            functions
        }

        fn filters(&self) -> Vec<TemplateFilter> {
            if self.0 {
                vec![TemplateFilter::new("legacy", |value: String| value)]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn replacing_extension_drops_its_stale_callables() {
        let mut environment = TemplateEnvironment::new(EnvironmentOptions::new(true, None));
        environment.add_extension(Arc::new(Stamp(true)));
        assert_eq!(environment.render_str("{{ legacy_stamp() }}", &json!({})).unwrap(), "legacy");

        environment.add_extension(Arc::new(Stamp(false)));
        assert_eq!(environment.render_str("{{ stamp() }}", &json!({})).unwrap(), "stamped");
        assert!(environment.render_str("{{ legacy_stamp() }}", &json!({})).is_err());
        assert!(environment.render_str("{{ 'x' | legacy }}", &json!({})).is_err());
    }

    #[test]
    fn strict_variables_reject_undefined() {
        let strict = TemplateEnvironment::new(EnvironmentOptions::new(true, None));
        assert!(strict.render_str("{{ missing }}", &json!({})).is_err());

        let lenient = TemplateEnvironment::default();
        assert_eq!(lenient.render_str("{{ missing }}", &json!({})).unwrap(), "");
    }

    #[test]
    fn globals_are_visible_to_templates() {
        let mut environment = TemplateEnvironment::default();
        environment.add_global("ga_tracking", json!("UA-XXXXX-X"));
        let rendered = environment.render_str("{{ ga_tracking }}", &json!({})).unwrap();
        assert_eq!(rendered, "UA-XXXXX-X");
        assert_eq!(environment.globals().len(), 1);
    }

    #[test]
    fn timezone_drives_date_filter() {
        let mut environment = TemplateEnvironment::default();
        environment.set_timezone(chrono_tz::Asia::Tokyo);
        let rendered = environment.render_str("{{ 0 | date('%H:%M') }}", &json!({})).unwrap();
        assert_eq!(rendered, "09:00");
        assert_eq!(environment.timezone(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn escaping_strategy_follows_autoescape() {
        let mut environment = TemplateEnvironment::default();
        assert_eq!(environment.escaping_strategy("page.html.twig"), AutoEscape::Html);

        environment.set_autoescape(Autoescape::Disabled);
        assert_eq!(environment.escaping_strategy("page.html.twig"), AutoEscape::None);
    }

    #[test]
    fn runtimes_come_from_first_matching_loader() {
        let mut environment = TemplateEnvironment::default();
        environment.add_runtime_loader(Arc::new(
            FactoryRuntimeLoader::new().with_factory("Markdown", || Value::from("first")),
        ));
        environment.add_runtime_loader(Arc::new(
            FactoryRuntimeLoader::new()
                .with_factory("Markdown", || Value::from("second"))
                .with_factory("Slugger", || Value::from("slugger")),
        ));

        assert_eq!(environment.runtime("Markdown").unwrap(), Value::from("first"));
        assert_eq!(environment.runtime("Slugger").unwrap(), Value::from("slugger"));
        assert!(matches!(
            environment.runtime("Missing"),
            Err(Error::RuntimeNotFound { ref name }) if name == "Missing"
        ));
    }
}
