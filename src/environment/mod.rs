//! Configured template environments
//!
//! The module is structured as:
//! - `engine`: the `TemplateEnvironment` wrapper around minijinja
//! - `factory`: building an environment from configuration and services

pub mod engine;
pub mod factory;

pub use engine::{EnvironmentOptions, TemplateEnvironment};
pub use factory::EnvironmentFactory;
