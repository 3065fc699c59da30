//! Configuration management for renderkit
//!
//! This module contains the configuration system components:
//! - `types`: typed engine options (escaping strategy, optimizer bitmask)
//! - `merge`: merging of raw configuration into normalized `Settings`
//! - `loader`: configuration file loading and parsing

pub mod loader;
pub mod merge;
pub mod types;


// Re-export commonly used types for convenience
pub use loader::load_config_file;
pub use merge::{merge_config, settings_from_locator, Settings};
pub use types::{Autoescape, Optimizations};
