//! URL generation helpers for templates.

use super::interface::{Extension, TemplateFunction};
use crate::constants::services;
use crate::container::{Service, ServiceLocator};
use crate::error::{value_kind, Error, Result};
use log::{debug, warn};
use minijinja::{ErrorKind, Value};
use std::sync::Arc;
use url::Url;

/// Route parameters, query parameters and generation options.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Generates URIs for named routes.
pub trait Router: Send + Sync {
    fn generate_uri(&self, name: &str, params: &Params, options: &Params) -> Result<String>;
}

/// Generates (relative) URLs for routes.
pub trait UrlHelper: Send + Sync {
    fn generate(
        &self,
        route: Option<&str>,
        params: &Params,
        query: &Params,
        fragment: Option<&str>,
        options: &Params,
    ) -> Result<String>;
}

/// Turns paths into absolute URLs for the current server.
pub trait ServerUrlHelper: Send + Sync {
    fn generate(&self, path: Option<&str>) -> String;
}

/// URL helper delegating path generation to a [`Router`].
///
/// The query string and fragment are appended to the routed URI.
pub struct RouterUrlHelper {
    router: Arc<dyn Router>,
}

impl RouterUrlHelper {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }
}

impl UrlHelper for RouterUrlHelper {
    fn generate(
        &self,
        route: Option<&str>,
        params: &Params,
        query: &Params,
        fragment: Option<&str>,
        options: &Params,
    ) -> Result<String> {
        let route = route.ok_or_else(|| {
            Error::UrlGenerationError("a route name is required".to_string())
        })?;
        let mut uri = self.router.generate_uri(route, params, options)?;

        if !query.is_empty() {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in query {
                match value {
                    serde_json::Value::String(s) => serializer.append_pair(key, s),
                    serde_json::Value::Null => serializer.append_key_only(key),
                    other => serializer.append_pair(key, &other.to_string()),
                };
            }
            uri.push('?');
            uri.push_str(&serializer.finish());
        }

        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            uri.push('#');
            uri.push_str(fragment);
        }

        Ok(uri)
    }
}

/// Server URL helper resolving paths against a fixed base URL.
pub struct BaseUrlServerHelper {
    base: Url,
}

impl BaseUrlServerHelper {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::UrlGenerationError(format!("invalid base URL '{base}': {e}")))?;
        Ok(Self { base })
    }
}

impl ServerUrlHelper for BaseUrlServerHelper {
    fn generate(&self, path: Option<&str>) -> String {
        let Some(path) = path else {
            return self.base.to_string();
        };
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        match self.base.join(path) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("Cannot resolve '{path}' against '{}': {e}", self.base);
                path.to_string()
            }
        }
    }
}

/// Extension exposing `path`, `url`, `absolute_url` and `asset` to templates.
#[derive(Clone)]
pub struct UrlExtension {
    server_url_helper: Arc<dyn ServerUrlHelper>,
    url_helper: Arc<dyn UrlHelper>,
    assets_url: String,
    assets_version: String,
}

impl UrlExtension {
    pub const NAME: &'static str = "url";

    pub fn new(
        server_url_helper: Arc<dyn ServerUrlHelper>,
        url_helper: Arc<dyn UrlHelper>,
        assets_url: impl Into<String>,
        assets_version: impl Into<String>,
    ) -> Self {
        Self {
            server_url_helper,
            url_helper,
            assets_url: assets_url.into(),
            assets_version: assets_version.into(),
        }
    }

    /// Builds the extension from services and the asset settings in `config`.
    ///
    /// A registered [`Router`] stands in for a missing [`UrlHelper`].
    ///
    /// # Errors
    /// * `Error::MissingHelper` if a required helper service is not registered
    pub fn from_locator(locator: &dyn ServiceLocator) -> Result<Self> {
        let server_url_helper = match locator.get(services::SERVER_URL_HELPER) {
            Some(Service::ServerUrlHelper(helper)) => helper,
            _ => {
                return Err(Error::MissingHelper {
                    service: services::SERVER_URL_HELPER.to_string(),
                })
            }
        };

        let url_helper: Arc<dyn UrlHelper> = match locator.get(services::URL_HELPER) {
            Some(Service::UrlHelper(helper)) => helper,
            _ => match locator.get(services::ROUTER) {
                Some(Service::Router(router)) => {
                    debug!("No URL helper registered; generating URLs through the router");
                    Arc::new(RouterUrlHelper::new(router))
                }
                _ => {
                    return Err(Error::MissingHelper {
                        service: services::URL_HELPER.to_string(),
                    })
                }
            },
        };

        let settings = crate::config::settings_from_locator(locator)?;
        Ok(Self::new(server_url_helper, url_helper, settings.assets_url, settings.assets_version))
    }

    /// Generates the URI of a route.
    pub fn render_uri(
        &self,
        route: Option<&str>,
        params: &Params,
        query: &Params,
        fragment: Option<&str>,
        options: &Params,
    ) -> Result<String> {
        self.url_helper.generate(route, params, query, fragment, options)
    }

    /// Generates the absolute URL of a route.
    pub fn render_url(
        &self,
        route: Option<&str>,
        params: &Params,
        query: &Params,
        fragment: Option<&str>,
        options: &Params,
    ) -> Result<String> {
        let path = self.render_uri(route, params, query, fragment, options)?;
        Ok(self.server_url_helper.generate(Some(&path)))
    }

    /// Turns a path into an absolute URL.
    pub fn render_url_from_path(&self, path: Option<&str>) -> String {
        self.server_url_helper.generate(path)
    }

    /// Builds an asset URL, appending `?v=<version>` when a version is known.
    ///
    /// An explicit non-empty `version` overrides the configured one.
    pub fn render_asset_url(&self, path: &str, version: Option<&str>) -> String {
        let version = match version {
            Some(v) if !v.is_empty() => v,
            _ => self.assets_version.as_str(),
        };
        if version.is_empty() {
            format!("{}{}", self.assets_url, path)
        } else {
            format!("{}{}?v={}", self.assets_url, path, version)
        }
    }
}

impl Extension for UrlExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        let path = self.clone();
        let url = self.clone();
        let absolute_url = self.clone();
        let asset = self.clone();
        vec![
            TemplateFunction::new(
                "path",
                move |route: Option<String>,
                      params: Option<Value>,
                      query: Option<Value>,
                      fragment: Option<String>,
                      options: Option<Value>|
                      -> Result<String, minijinja::Error> {
                    path.render_uri(
                        route.as_deref(),
                        &to_params(params)?,
                        &to_params(query)?,
                        fragment.as_deref(),
                        &to_params(options)?,
                    )
                    .map_err(to_template_error)
                },
            ),
            TemplateFunction::new(
                "url",
                move |route: Option<String>,
                      params: Option<Value>,
                      query: Option<Value>,
                      fragment: Option<String>,
                      options: Option<Value>|
                      -> Result<String, minijinja::Error> {
                    url.render_url(
                        route.as_deref(),
                        &to_params(params)?,
                        &to_params(query)?,
                        fragment.as_deref(),
                        &to_params(options)?,
                    )
                    .map_err(to_template_error)
                },
            ),
            TemplateFunction::new("absolute_url", move |path: Option<String>| -> String {
                absolute_url.render_url_from_path(path.as_deref())
            }),
            TemplateFunction::new("asset", move |path: String, version: Option<Value>| -> String {
                let version = version
                    .filter(|v| !v.is_undefined() && !v.is_none())
                    .map(|v| v.to_string());
                asset.render_asset_url(&path, version.as_deref())
            }),
        ]
    }
}

fn to_params(value: Option<Value>) -> Result<Params, minijinja::Error> {
    let Some(value) = value.filter(|v| !v.is_undefined() && !v.is_none()) else {
        return Ok(Params::new());
    };
    match serde_json::to_value(&value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("expected a mapping, received {}", value_kind(&other)),
        )),
        Err(e) => Err(minijinja::Error::new(ErrorKind::InvalidOperation, "invalid parameters")
            .with_source(e)),
    }
}

fn to_template_error(err: Error) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingUrlHelper {
        calls: Mutex<Vec<(Option<String>, Params)>>,
    }

    impl UrlHelper for RecordingUrlHelper {
        fn generate(
            &self,
            route: Option<&str>,
            params: &Params,
            _query: &Params,
            _fragment: Option<&str>,
            _options: &Params,
        ) -> Result<String> {
            self.calls.lock().unwrap().push((route.map(String::from), params.clone()));
            Ok("PATH".to_string())
        }
    }

    struct HostServerHelper;

    impl ServerUrlHelper for HostServerHelper {
        fn generate(&self, path: Option<&str>) -> String {
            format!("HOST/{}", path.unwrap_or_default())
        }
    }

    struct StaticRouter;

    impl Router for StaticRouter {
        fn generate_uri(&self, name: &str, params: &Params, _options: &Params) -> Result<String> {
            match params.get("id") {
                Some(id) => Ok(format!("/{name}/{id}")),
                None => Ok(format!("/{name}")),
            }
        }
    }

    fn create_extension(assets_url: &str, assets_version: &str) -> UrlExtension {
        UrlExtension::new(
            Arc::new(HostServerHelper),
            Arc::new(RecordingUrlHelper::default()),
            assets_url,
            assets_version,
        )
    }

    fn id_params() -> Params {
        json!({"id": 1}).as_object().cloned().unwrap()
    }

    #[test]
    fn registers_template_functions() {
        let names: Vec<_> = create_extension("", "")
            .functions()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["path", "url", "absolute_url", "asset"]);
    }

    #[test]
    fn render_uri_delegates_to_url_helper() {
        let helper = Arc::new(RecordingUrlHelper::default());
        let extension =
            UrlExtension::new(Arc::new(HostServerHelper), helper.clone(), "", "");

        let uri = extension
            .render_uri(Some("foo"), &id_params(), &Params::new(), None, &Params::new())
            .unwrap();

        assert_eq!(uri, "PATH");
        let calls = helper.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(Some("foo".to_string()), id_params())]);
    }

    #[test]
    fn render_url_delegates_to_both_helpers() {
        let extension = create_extension("", "");
        let url = extension
            .render_url(Some("foo"), &id_params(), &Params::new(), None, &Params::new())
            .unwrap();
        assert_eq!(url, "HOST/PATH");
    }

    #[test]
    fn render_url_from_path_delegates_to_server_helper() {
        assert_eq!(create_extension("", "").render_url_from_path(Some("PATH")), "HOST/PATH");
    }

    #[test]
    fn asset_url_uses_configured_version() {
        let extension = create_extension("https://images.example.com/", "XYZ");
        assert_eq!(
            extension.render_asset_url("foo.png", None),
            "https://images.example.com/foo.png?v=XYZ"
        );
    }

    #[test]
    fn asset_url_prefers_explicit_version() {
        let extension = create_extension("https://images.example.com/", "XYZ");
        assert_eq!(
            extension.render_asset_url("foo.png", Some("ABC")),
            "https://images.example.com/foo.png?v=ABC"
        );
    }

    #[test]
    fn asset_url_without_version() {
        let extension = create_extension("https://images.example.com/", "");
        assert_eq!(extension.render_asset_url("foo.png", None), "https://images.example.com/foo.png");
        assert_eq!(
            extension.render_asset_url("foo.png", Some("")),
            "https://images.example.com/foo.png"
        );
    }

    #[test]
    fn zero_is_a_valid_asset_version() {
        let extension = create_extension("https://images.example.com/", "0");
        assert_eq!(
            extension.render_asset_url("foo.png", None),
            "https://images.example.com/foo.png?v=0"
        );
    }

    #[test]
    fn router_helper_appends_query_and_fragment() {
        let helper = RouterUrlHelper::new(Arc::new(StaticRouter));
        let query = json!({"page": 2, "q": "a b"}).as_object().cloned().unwrap();
        let uri = helper
            .generate(Some("post"), &id_params(), &query, Some("comments"), &Params::new())
            .unwrap();
        assert_eq!(uri, "/post/1?page=2&q=a+b#comments");
    }

    #[test]
    fn router_helper_requires_a_route() {
        let helper = RouterUrlHelper::new(Arc::new(StaticRouter));
        let err = helper
            .generate(None, &Params::new(), &Params::new(), None, &Params::new())
            .unwrap_err();
        assert!(matches!(err, Error::UrlGenerationError(_)));
    }

    #[test]
    fn base_url_helper_resolves_paths() {
        let helper = BaseUrlServerHelper::new("https://example.com/app/").unwrap();
        assert_eq!(helper.generate(None), "https://example.com/app/");
        assert_eq!(helper.generate(Some("/login")), "https://example.com/login");
        assert_eq!(helper.generate(Some("users")), "https://example.com/app/users");
        assert_eq!(helper.generate(Some("https://cdn.example.com/x")), "https://cdn.example.com/x");
    }

    #[test]
    fn from_locator_requires_helpers() {
        let err = UrlExtension::from_locator(&Container::new()).err().unwrap();
        assert!(matches!(err, Error::MissingHelper { ref service } if service == services::SERVER_URL_HELPER));

        let container = Container::new()
            .with(services::SERVER_URL_HELPER, Service::ServerUrlHelper(Arc::new(HostServerHelper)));
        let err = UrlExtension::from_locator(&container).err().unwrap();
        assert!(matches!(err, Error::MissingHelper { ref service } if service == services::URL_HELPER));
    }

    #[test]
    fn from_locator_falls_back_to_router_and_reads_asset_config() {
        let container = Container::new()
            .with(services::SERVER_URL_HELPER, Service::ServerUrlHelper(Arc::new(HostServerHelper)))
            .with(services::ROUTER, Service::Router(Arc::new(StaticRouter)))
            .with(
                services::CONFIG,
                Service::Config(json!({
                    "templates": {"assets_url": "/static/", "assets_version": 7},
                })),
            );

        let extension = UrlExtension::from_locator(&container).unwrap();
        assert_eq!(extension.render_asset_url("app.css", None), "/static/app.css?v=7");
        let uri = extension
            .render_uri(Some("home"), &Params::new(), &Params::new(), None, &Params::new())
            .unwrap();
        assert_eq!(uri, "/home");
    }
}
