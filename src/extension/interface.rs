use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::Value;

/// Trait for template extensions.
///
/// Registering two extensions with the same name keeps the later one.
pub trait Extension: Send + Sync {
    /// Unique name of the extension.
    fn name(&self) -> &str;

    /// Functions callable from templates.
    fn functions(&self) -> Vec<TemplateFunction>;

    /// Filters applicable in templates.
    fn filters(&self) -> Vec<TemplateFilter> {
        Vec::new()
    }
}

/// A named function exposed to templates.
#[derive(Debug, Clone)]
pub struct TemplateFunction {
    name: String,
    callable: Value,
}

impl TemplateFunction {
    /// Wraps any minijinja-compatible function under `name`.
    pub fn new<F, Rv, Args>(name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        Self { name: name.into(), callable: Value::from_function(f) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function as a callable template value.
    pub fn callable(&self) -> &Value {
        &self.callable
    }
}

/// A named filter exposed to templates.
///
/// The filtered value is passed as the first argument.
#[derive(Debug, Clone)]
pub struct TemplateFilter {
    name: String,
    callable: Value,
}

impl TemplateFilter {
    pub fn new<F, Rv, Args>(name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        Self { name: name.into(), callable: Value::from_function(f) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callable(&self) -> &Value {
        &self.callable
    }
}
