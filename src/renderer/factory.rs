use crate::config::settings_from_locator;
use crate::constants::services;
use crate::container::{Service, ServiceLocator};
use crate::environment::EnvironmentFactory;
use crate::error::{Error, Result};
use crate::renderer::MiniJinjaRenderer;
use log::{debug, warn};

/// Builds [`MiniJinjaRenderer`]s from the services of a locator.
pub struct RendererFactory;

impl RendererFactory {
    /// Creates a renderer using the registered environment service.
    ///
    /// Without an environment service one is built from configuration and a
    /// deprecation warning is logged.
    ///
    /// # Errors
    /// * `Error::InvalidEnvironmentKind` if the environment service has another kind
    /// * Any error of [`EnvironmentFactory::create`] when the environment is
    ///   built here
    pub fn create(locator: &dyn ServiceLocator) -> Result<MiniJinjaRenderer> {
        let settings = settings_from_locator(locator)?;

        let environment = match locator.get(services::ENVIRONMENT) {
            Some(Service::Environment(environment)) => environment,
            Some(other) => {
                return Err(Error::InvalidEnvironmentKind { kind: other.kind().to_string() })
            }
            None => {
                warn!(
                    "No '{}' service registered; building the template environment from \
                     configuration is deprecated",
                    services::ENVIRONMENT
                );
                EnvironmentFactory::create_with_settings(&settings, locator)?
            }
        };

        debug!("Creating renderer for '.{}' templates", settings.extension);
        let mut renderer = MiniJinjaRenderer::new(environment, settings.extension);
        for path in settings.paths {
            renderer.add_template_path(path);
        }
        Ok(renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::environment::TemplateEnvironment;
    use crate::renderer::TemplateRenderer;
    use serde_json::json;

    #[test]
    fn unconfigured_renderer_has_no_paths() {
        let renderer = RendererFactory::create(&Container::new()).unwrap();
        assert!(renderer.paths().is_empty());
        assert_eq!(renderer.suffix(), "html.twig");
    }

    #[test]
    fn uses_registered_environment() {
        let mut environment = TemplateEnvironment::default();
        environment.add_global("from_service", json!(true));
        let container = Container::new()
            .with(services::ENVIRONMENT, Service::Environment(environment))
            .with(services::CONFIG, Service::Config(json!({"twig": {"globals": {"ignored": 1}}})));

        let renderer = RendererFactory::create(&container).unwrap();
        assert!(renderer.environment().globals().contains_key("from_service"));
        assert!(!renderer.environment().globals().contains_key("ignored"));
    }

    #[test]
    fn rejects_environment_service_of_wrong_kind() {
        let container =
            Container::new().with(services::ENVIRONMENT, Service::Value(json!("environment")));
        assert!(matches!(
            RendererFactory::create(&container),
            Err(Error::InvalidEnvironmentKind { ref kind }) if kind == "string"
        ));
    }
}
