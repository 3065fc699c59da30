//! Typed forms of the engine options carried in configuration

use crate::constants::ENGINE_FILE_SUFFIX;
use crate::error::{Error, Result};
use minijinja::AutoEscape;
use serde_json::Value;

/// Escaping strategy applied to template output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Autoescape {
    /// No escaping
    Disabled,
    /// HTML escaping for every template
    #[default]
    Html,
    /// JSON escaping for every template
    Json,
    /// Strategy chosen from the template file name
    ByName,
}

impl Autoescape {
    /// Parses the raw `autoescape` configuration value.
    ///
    /// # Errors
    /// * `Error::InvalidAutoescape` for unknown strategies and unsupported kinds
    pub fn from_config(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(false) => Ok(Autoescape::Disabled),
            Value::Bool(true) => Ok(Autoescape::Html),
            Value::String(strategy) => match strategy.as_str() {
                "html" | "html_attr" => Ok(Autoescape::Html),
                "json" => Ok(Autoescape::Json),
                "name" => Ok(Autoescape::ByName),
                _ => Err(Error::InvalidAutoescape { value: value.to_string() }),
            },
            other => Err(Error::InvalidAutoescape { value: other.to_string() }),
        }
    }

    /// The escaping applied to the template called `name`.
    pub fn for_template(&self, name: &str) -> AutoEscape {
        match self {
            Autoescape::Disabled => AutoEscape::None,
            Autoescape::Html => AutoEscape::Html,
            Autoescape::Json => AutoEscape::Json,
            Autoescape::ByName => minijinja::default_auto_escape_callback(
                name.strip_suffix(ENGINE_FILE_SUFFIX).unwrap_or(name),
            ),
        }
    }
}

/// Optimizer bitmask; `0` disables every optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Optimizations(pub u64);

impl Optimizations {
    pub const NONE: Optimizations = Optimizations(0);
    pub const ALL: Optimizations = Optimizations(u64::MAX);

    /// Parses the raw `optimizations` configuration value.
    ///
    /// Non-negative integers are kept verbatim and `-1` selects every
    /// optimization.
    ///
    /// # Errors
    /// * `Error::InvalidOptimizations` for any other value
    pub fn from_config(value: &Value) -> Result<Self> {
        let invalid = || Error::InvalidOptimizations { value: value.to_string() };
        if let Some(bits) = value.as_u64() {
            return Ok(Optimizations(bits));
        }
        match value.as_i64() {
            Some(-1) => Ok(Optimizations::ALL),
            _ => Err(invalid()),
        }
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn is_enabled(&self, flag: u64) -> bool {
        self.0 & flag == flag
    }
}

impl Default for Optimizations {
    fn default() -> Self {
        Optimizations::ALL
    }
}
