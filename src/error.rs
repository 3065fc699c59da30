use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YAMLParseError(#[from] serde_yaml::Error),

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Config service MUST be an object; received {kind}")]
    InvalidConfigKind { kind: String },

    #[error("Unsupported configuration file '{path}'. Expected one of: {formats}.")]
    UnsupportedConfigFormat { path: String, formats: String },

    #[error("Extension must be an extension instance or a service name; received {kind}")]
    InvalidExtensionKind { kind: String },

    #[error("Extension service '{key}' could not be found")]
    UnresolvableReference { key: String },

    #[error("Runtime loader must be a runtime loader instance or a service name; received {kind}")]
    InvalidRuntimeLoaderKind { kind: String },

    #[error("Runtime loader service '{key}' could not be found")]
    UnresolvableRuntimeLoaderReference { key: String },

    #[error("\"timezone\" configuration value must be a string; received {kind}")]
    InvalidTimezoneKind { kind: String },

    #[error("Unknown or invalid timezone: '{timezone}'")]
    UnknownTimezone { timezone: String },

    #[error("Invalid \"autoescape\" configuration value: {value}")]
    InvalidAutoescape { value: String },

    #[error("Invalid \"optimizations\" configuration value: {value}")]
    InvalidOptimizations { value: String },

    #[error("Template path for namespace '{namespace}' must be a string; received {kind}")]
    InvalidTemplatePath { namespace: String, kind: String },

    /// A URL extension was requested but one of its helper services is missing.
    #[error("Cannot build the URL extension: missing '{service}' service")]
    MissingHelper { service: String },

    #[error("Unable to load the runtime '{name}'")]
    RuntimeNotFound { name: String },

    #[error("URL generation failed: {0}.")]
    UrlGenerationError(String),

    #[error("Environment service MUST be a template environment; received {kind}")]
    InvalidEnvironmentKind { kind: String },

    #[error("Template parameters MUST be an object; received {kind}")]
    InvalidParamsKind { kind: String },
}

/// Convenience type alias for Results with the crate error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(crate::constants::exit_codes::FAILURE);
}

/// Returns the runtime kind name of a raw configuration value.
pub fn value_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
