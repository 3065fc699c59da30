use crate::config::{settings_from_locator, Settings};
use crate::constants::services;
use crate::container::{Service, ServiceLocator};
use crate::environment::{EnvironmentOptions, TemplateEnvironment};
use crate::error::{Error, Result};
use crate::extension::{DebugExtension, UrlExtension};
use crate::resolver::{resolve_extensions, resolve_runtime_loaders};
use log::debug;
use std::sync::Arc;

/// Builds [`TemplateEnvironment`]s from the services of a locator.
pub struct EnvironmentFactory;

impl EnvironmentFactory {
    /// Creates an environment from the `config` service of `locator`.
    ///
    /// Every reference is resolved and every option validated before the
    /// environment is returned; the first failure aborts the build.
    ///
    /// # Errors
    /// * `Error::InvalidConfigKind` if the configuration is not an object
    /// * `Error::InvalidExtensionKind` / `Error::UnresolvableReference` for
    ///   bad extension references
    /// * `Error::InvalidRuntimeLoaderKind` /
    ///   `Error::UnresolvableRuntimeLoaderReference` for bad runtime loaders
    /// * `Error::InvalidTimezoneKind` / `Error::UnknownTimezone` for a bad timezone
    /// * `Error::InvalidAutoescape` / `Error::InvalidOptimizations` for bad
    ///   engine options
    pub fn create(locator: &dyn ServiceLocator) -> Result<TemplateEnvironment> {
        let settings = settings_from_locator(locator)?;
        Self::create_with_settings(&settings, locator)
    }

    /// Creates an environment from already merged settings.
    pub fn create_with_settings(
        settings: &Settings,
        locator: &dyn ServiceLocator,
    ) -> Result<TemplateEnvironment> {
        let options = EnvironmentOptions::new(settings.debug, settings.cache_dir.clone());
        debug!("Creating template environment with {options:?}");
        let mut environment = TemplateEnvironment::new(options);

        match locator.get(services::URL_EXTENSION) {
            Some(Service::Extension(extension)) => environment.add_extension(extension),
            Some(other) => {
                return Err(Error::InvalidExtensionKind { kind: other.kind().to_string() })
            }
            None if locator.has(services::SERVER_URL_HELPER) => {
                environment.add_extension(Arc::new(UrlExtension::from_locator(locator)?));
            }
            None => debug!("No URL helpers registered; skipping the URL extension"),
        }

        if settings.debug {
            environment.add_extension(Arc::new(DebugExtension));
        }

        for extension in resolve_extensions(&settings.extensions, locator)? {
            environment.add_extension(extension);
        }
        for loader in resolve_runtime_loaders(&settings.runtime_loaders, locator)? {
            environment.add_runtime_loader(loader);
        }

        for (name, value) in &settings.globals {
            environment.add_global(name.clone(), value.clone());
        }

        if let Some(timezone) = settings.timezone()? {
            debug!("Rendering dates in {timezone}");
            environment.set_timezone(timezone);
        }
        if let Some(autoescape) = settings.autoescape()? {
            environment.set_autoescape(autoescape);
        }
        if let Some(optimizations) = settings.optimizations()? {
            environment.set_optimizations(optimizations);
        }

        Ok(environment)
    }
}
