use super::interface::{Extension, TemplateFunction};
use minijinja::value::Rest;
use minijinja::Value;

/// Extension registered in debug mode; provides `dump(...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugExtension;

impl DebugExtension {
    pub const NAME: &'static str = "debug";
}

/// Pretty-prints every argument, one per line.
pub fn dump(values: &[Value]) -> String {
    values.iter().map(|value| format!("{value:#?}")).collect::<Vec<_>>().join("\n")
}

impl Extension for DebugExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        vec![TemplateFunction::new("dump", |values: Rest<Value>| -> String { dump(&values) })]
    }
}
