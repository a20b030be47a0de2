//! Embeddable tracking gateway with builder pattern.
//!
//! # Example
//!
//! ```rust,no_run
//! use scriptgate::Gateway;
//!
//! # async fn example() -> scriptgate::Result<()> {
//! let mut gateway = Gateway::builder()
//!     .config_file("tracking.yaml")
//!     .bind("0.0.0.0:8080".parse().unwrap())
//!     .public_url("https://www.example.com")
//!     .build()?;
//!
//! gateway.start().await?;
//! tokio::signal::ctrl_c().await?;
//! gateway.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{GatewayConfig, TrackingSource};
use scriptgate_common::{ConfigHandle, FetchConfig, Result, TrackingConfig, TrackingError};
use scriptgate_http::{
    inject_snippets, render_snippets, zone_for_path, HttpServerConfig, InjectionConfig,
    TrackingServer,
};
use scriptgate_provider::{
    ProviderContext, ProviderKind, RouteTable, ScriptFetcher, Snippet, SnippetRenderer,
    TrackingExtension,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};
use url::Url;

/// A tracking gateway that can be embedded in your application.
///
/// Use [`Gateway::builder()`] to create a new gateway with the builder pattern.
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    extension: Arc<TrackingExtension>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<Result<()>>>,
}

/// Builder for constructing a [`Gateway`] with ergonomic configuration.
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
}

impl Gateway {
    /// Create a new gateway builder.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is already running or the address
    /// cannot be bound.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.task.is_some() {
            return Err(TrackingError::InvalidState(
                "gateway already started".into(),
            ));
        }

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Starting scriptgate");
        info!("  HTTP bind: {}", local_addr);
        info!("  Public URL: {}", self.config.public_url);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let shutdown = async move {
            // A dropped sender also counts as shutdown.
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        };

        let server = self.server();
        self.task = Some(tokio::spawn(async move {
            let result = server.serve(listener, shutdown).await;
            if let Err(e) = &result {
                error!("HTTP server failed: {}", e);
            }
            result
        }));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Shutdown the gateway and wait for in-flight requests to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stop();
        self.local_addr = None;
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(e) => {
                    return Err(TrackingError::InvalidState(format!(
                        "server task panicked: {e}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Signal the gateway to stop (non-blocking).
    ///
    /// Use [`shutdown()`](Self::shutdown) if you need to wait for cleanup.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
    }

    /// Check if the gateway is currently running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Address the server is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The booted tracking extension.
    pub fn extension(&self) -> &TrackingExtension {
        &self.extension
    }

    /// Proxy routes of the enabled providers.
    pub fn routes(&self) -> RouteTable {
        let mut routes = RouteTable::new();
        self.extension.register_frontend_routes(&mut routes);
        routes
    }

    /// Page snippets of the enabled providers.
    pub fn snippets(&self) -> Vec<Snippet> {
        self.extension.register_assets()
    }

    /// Inject the snippets that apply to `path` into an HTML page.
    pub fn render_page(&self, html: &str, path: &str) -> String {
        let zone = zone_for_path(path, &self.config.backend_prefix);
        let fragments = render_snippets(&self.snippets(), zone);
        inject_snippets(html, &fragments)
    }

    /// HTTP server for the current routes and snippets.
    pub fn server(&self) -> TrackingServer {
        TrackingServer::with_config(
            self.config.bind_addr,
            self.routes(),
            self.snippets(),
            HttpServerConfig {
                site_dir: self.config.site_dir.clone(),
                injection: InjectionConfig {
                    backend_prefix: self.config.backend_prefix.clone(),
                    ..InjectionConfig::default()
                },
            },
        )
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        // Best-effort signal shutdown on drop
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
    }
}

impl GatewayBuilder {
    /// Use an already parsed tracking configuration.
    #[must_use]
    pub fn tracking(mut self, config: TrackingConfig) -> Self {
        self.config.tracking = TrackingSource::Inline(config);
        self
    }

    /// Load the tracking configuration from a YAML file at build time.
    #[must_use]
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tracking = TrackingSource::File(path.into());
        self
    }

    /// Set the address to bind the HTTP server.
    ///
    /// Default: `0.0.0.0:8080`
    #[must_use]
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the public origin used for absolute proxy URLs.
    ///
    /// Default: `http://localhost:8080`
    #[must_use]
    pub fn public_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_url = url.into();
        self
    }

    /// Replace the upstream fetch settings.
    #[must_use]
    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    /// Per-attempt upstream timeout.
    #[must_use]
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    /// Retries after a failed upstream attempt.
    #[must_use]
    pub fn upstream_retries(mut self, retries: u32) -> Self {
        self.config.fetch.retries = retries;
        self
    }

    /// How long fetched scripts are reused; zero disables caching.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.fetch.cache_ttl = ttl;
        self
    }

    /// Load snippet template overrides from `dir/providers/`.
    #[must_use]
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    /// Serve a static site with snippets injected into its pages.
    #[must_use]
    pub fn site_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.site_dir = Some(dir.into());
        self
    }

    /// Paths under this prefix are backend pages.
    ///
    /// Default: `/admin`
    #[must_use]
    pub fn backend_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.backend_prefix = prefix.into();
        self
    }

    /// Build the gateway with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, the tracking
    /// configuration cannot be loaded, it names an unknown provider, or a
    /// template override fails to parse.
    pub fn build(self) -> Result<Gateway> {
        self.config.validate()?;

        let tracking = self.config.tracking.load()?;
        tracking.validate(&ProviderKind::known_names())?;

        let renderer = match &self.config.template_dir {
            Some(dir) => SnippetRenderer::with_template_dir(dir)?,
            None => SnippetRenderer::new()?,
        };
        let fetcher = ScriptFetcher::new(self.config.fetch.clone())?;
        let context = ProviderContext::new(
            ConfigHandle::new(tracking),
            Arc::new(renderer),
            Arc::new(fetcher),
            Url::parse(&self.config.public_url)?,
        );

        Ok(Gateway {
            config: self.config,
            extension: Arc::new(TrackingExtension::boot(context)),
            local_addr: None,
            shutdown_tx: None,
            task: None,
        })
    }
}
