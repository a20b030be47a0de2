use crate::context::ProviderContext;
use crate::render::template_name;
use crate::routes::RouteTable;
use async_trait::async_trait;
use bytes::Bytes;
use scriptgate_common::constants::TRACKING_ROUTE_NAME_PREFIX;
use scriptgate_common::{
    ProviderConfig, Result, TrackingError, SCRIPT_CACHE_CONTROL, SCRIPT_CONTENT_TYPE,
    TRACKING_BASE_PATH,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Optional provider key that replaces the built-in remote script URL.
pub const SCRIPT_URL_OVERRIDE_KEY: &str = "script_url";

/// Static description of a provider variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Unique provider name, also the key under `providers` in the configuration
    pub name: &'static str,
    /// Keys that must be present and non-null in the provider's configuration
    pub required_config_keys: &'static [&'static str],
    /// Script served through the proxy route
    pub remote_script_url: &'static str,
}

/// Script body fetched from upstream, with the headers it is served with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyScript {
    pub body: Bytes,
    pub content_type: &'static str,
    pub cache_control: &'static str,
}

impl ProxyScript {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            content_type: SCRIPT_CONTENT_TYPE,
            cache_control: SCRIPT_CACHE_CONTROL,
        }
    }

    pub fn headers(&self) -> [(&'static str, &'static str); 2] {
        [
            ("content-type", self.content_type),
            ("cache-control", self.cache_control),
        ]
    }
}

/// Proxy route path for a provider name (`/tracking/<lowercase name>`)
pub fn script_route(name: &str) -> String {
    format!("{TRACKING_BASE_PATH}{}", name.to_lowercase())
}

/// Proxy route name for a provider name (`tracking_<lowercase name>`)
pub fn script_route_name(name: &str) -> String {
    format!("{TRACKING_ROUTE_NAME_PREFIX}{}", name.to_lowercase())
}

/// Core provider trait
///
/// Variants supply a [`ProviderDescriptor`] and their [`ProviderContext`];
/// everything else has a default built on those two. Variants that need extra
/// render data override [`Provider::fetch_snippet`] and finish with
/// [`Provider::render_snippet`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// Static description of this variant
    fn descriptor(&self) -> &'static ProviderDescriptor;

    /// Collaborators handed over at construction
    fn context(&self) -> &ProviderContext;

    /// Provider name (for configuration, routes and logging)
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn required_config_keys(&self) -> &'static [&'static str] {
        self.descriptor().required_config_keys
    }

    /// Script URL to proxy. The `script_url` provider key takes precedence over
    /// the built-in URL.
    fn remote_script_url(&self) -> String {
        self.fetch_config()
            .ok()
            .and_then(|config| {
                config
                    .get(SCRIPT_URL_OVERRIDE_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| self.descriptor().remote_script_url.to_string())
    }

    /// This provider's section of the configuration.
    ///
    /// Callers check [`Provider::is_enabled`] first; an unlisted provider yields
    /// [`TrackingError::ProviderNotConfigured`].
    fn fetch_config(&self) -> Result<ProviderConfig> {
        self.context()
            .config()
            .read(|config| config.provider_config(self.name()))
    }

    /// Listed in the `providers` mapping. A null mapping disables everything.
    fn is_enabled(&self) -> bool {
        self.context()
            .config()
            .read(|config| config.is_provider_listed(self.name()))
    }

    /// Fails on the first required key (in declared order) that is missing or null
    fn check_configuration(&self) -> Result<()> {
        let config = self.fetch_config()?;
        for key in self.required_config_keys() {
            match config.get(*key) {
                Some(value) if !value.is_null() => continue,
                _ => {
                    return Err(TrackingError::ConfigurationInvalid {
                        provider: self.name().to_string(),
                        key: (*key).to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Every required key has a value. Logs a warning naming the offending key
    /// otherwise.
    fn is_configured(&self) -> bool {
        match self.check_configuration() {
            Ok(()) => true,
            Err(e) => {
                warn!(event = "extension", provider = self.name(), "{}", e);
                false
            }
        }
    }

    /// HTML snippet for the page. Base providers render with no extra data.
    fn fetch_snippet(&self) -> Result<String> {
        self.fetch_config()?;
        self.render_snippet(tera::Context::new())
    }

    /// Render `providers/<name>` with `data` plus the absolute proxy URL as
    /// `script`. Keys already present in `data` are kept.
    fn render_snippet(&self, mut data: tera::Context) -> Result<String> {
        let context = self.context();
        if !data.contains_key("script") {
            data.insert("script", &context.absolute_url(&self.script_route()));
        }
        context.renderer().render(&template_name(self.name()), &data)
    }

    fn script_route(&self) -> String {
        script_route(self.name())
    }

    fn script_route_name(&self) -> String {
        script_route_name(self.name())
    }

    /// Fetch the remote script and wrap it with the proxy headers
    async fn fetch_proxy_script(&self) -> Result<ProxyScript> {
        let url = self.remote_script_url();
        let body = self.context().fetcher().fetch(&url).await?;
        Ok(ProxyScript::new(body))
    }
}

impl dyn Provider {
    /// Bind a GET route for this provider's proxy script
    pub fn register_route(self: Arc<Self>, routes: &mut RouteTable) {
        let path = self.script_route();
        let name = self.script_route_name();
        routes.get(path, name, self);
    }
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
