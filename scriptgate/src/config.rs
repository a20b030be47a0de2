//! Configuration types for embedding a `scriptgate` gateway.
//!
//! Use [`GatewayBuilder`](crate::GatewayBuilder) for ergonomic construction.

use scriptgate_common::{
    FetchConfig, Result, TrackingConfig, TrackingError, DEFAULT_BACKEND_PREFIX,
    DEFAULT_HTTP_BIND, DEFAULT_PUBLIC_URL,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Where the tracking configuration comes from
#[derive(Debug, Clone)]
pub enum TrackingSource {
    /// Already parsed configuration
    Inline(TrackingConfig),
    /// YAML file loaded when the gateway is built
    File(PathBuf),
}

impl Default for TrackingSource {
    fn default() -> Self {
        TrackingSource::Inline(TrackingConfig::default())
    }
}

impl TrackingSource {
    /// Resolve the source into a configuration
    pub fn load(&self) -> Result<TrackingConfig> {
        match self {
            TrackingSource::Inline(config) => Ok(config.clone()),
            TrackingSource::File(path) => TrackingConfig::load(path),
        }
    }
}

/// Configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Tracking providers configuration
    pub tracking: TrackingSource,

    /// Address the HTTP server binds
    pub bind_addr: SocketAddr,

    /// Public origin the application is reachable at; proxy URLs in
    /// snippets are built from it
    pub public_url: String,

    /// Upstream fetch settings
    pub fetch: FetchConfig,

    /// Directory with `providers/<Name>.html.tera` template overrides
    pub template_dir: Option<PathBuf>,

    /// Static site to serve with snippets injected
    pub site_dir: Option<PathBuf>,

    /// Paths under this prefix are backend pages and get no frontend snippets
    pub backend_prefix: String,
}

impl GatewayConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.public_url).map_err(|e| {
            TrackingError::Config(format!("public_url {:?} is invalid: {e}", self.public_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TrackingError::Config(format!(
                "public_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if !self.backend_prefix.is_empty() && !self.backend_prefix.starts_with('/') {
            return Err(TrackingError::Config(
                "backend_prefix must start with '/'".into(),
            ));
        }
        if let Some(dir) = &self.site_dir {
            if !dir.is_dir() {
                return Err(TrackingError::Config(format!(
                    "site_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        self.fetch.validate()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            tracking: TrackingSource::default(),
            bind_addr: DEFAULT_HTTP_BIND
                .parse()
                .unwrap_or_else(|_| ([0, 0, 0, 0], 8080).into()),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            fetch: FetchConfig::default(),
            template_dir: None,
            site_dir: None,
            backend_prefix: DEFAULT_BACKEND_PREFIX.to_string(),
        }
    }
}
