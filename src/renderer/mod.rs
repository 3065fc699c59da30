//! Template rendering
//!
//! - `interface`: the `TemplateRenderer` trait
//! - `minijinja`: the minijinja-backed renderer
//! - `loader`: namespaced filesystem template lookup
//! - `factory`: building a renderer from configuration and services

pub mod factory;
pub mod interface;
pub mod loader;
pub mod minijinja;

pub use factory::RendererFactory;
pub use interface::TemplateRenderer;
pub use loader::NamespacedLoader;
pub use self::minijinja::MiniJinjaRenderer;
