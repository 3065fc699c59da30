//! Constants used throughout renderkit

/// Configuration file extensions understood by the config loader
pub const CONFIG_FORMATS: &[&str] = &["json", "yaml", "yml"];

/// Default template file suffix
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "html.twig";

/// Suffix stripped from template names before choosing an escaping strategy by name
pub const ENGINE_FILE_SUFFIX: &str = ".twig";

/// Template name used to register default parameters for every template
pub const TEMPLATE_ALL: &str = "*";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Raw configuration keys
pub mod keys {
    pub const DEBUG: &str = "debug";
    pub const TEMPLATES: &str = "templates";
    pub const TWIG: &str = "twig";

    pub const EXTENSION: &str = "extension";
    pub const PATHS: &str = "paths";
    pub const CACHE_DIR: &str = "cache_dir";
    pub const ASSETS_URL: &str = "assets_url";
    pub const ASSETS_VERSION: &str = "assets_version";
    pub const EXTENSIONS: &str = "extensions";
    pub const RUNTIME_LOADERS: &str = "runtime_loaders";
    pub const GLOBALS: &str = "globals";
    pub const TIMEZONE: &str = "timezone";
    pub const AUTOESCAPE: &str = "autoescape";
    pub const OPTIMIZATIONS: &str = "optimizations";
}

/// Well-known service names looked up in the service locator
pub mod services {
    pub const CONFIG: &str = "config";
    pub const ENVIRONMENT: &str = "renderkit.environment";
    pub const URL_EXTENSION: &str = "renderkit.url_extension";
    pub const URL_HELPER: &str = "renderkit.url_helper";
    pub const SERVER_URL_HELPER: &str = "renderkit.server_url_helper";
    pub const ROUTER: &str = "renderkit.router";
}

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
