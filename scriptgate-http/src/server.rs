use crate::inject::{InjectionConfig, SnippetInjectionLayer};
use crate::proxy::script_router;
use axum::routing::get;
use axum::Router;
use scriptgate_common::Result;
use scriptgate_provider::{RouteTable, Snippet};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Configuration for the HTTP server
#[derive(Debug, Clone, Default)]
pub struct HttpServerConfig {
    /// Static site served for every path the proxy routes don't match
    pub site_dir: Option<PathBuf>,
    /// Snippet injection settings for the static site
    pub injection: InjectionConfig,
}

/// Serves the provider proxy routes, a health check and optionally a static
/// site with tracking snippets injected into its HTML pages.
pub struct TrackingServer {
    addr: SocketAddr,
    routes: RouteTable,
    snippets: Arc<Vec<Snippet>>,
    config: HttpServerConfig,
}

impl TrackingServer {
    pub fn new(addr: SocketAddr, routes: RouteTable, snippets: Vec<Snippet>) -> Self {
        Self::with_config(addr, routes, snippets, HttpServerConfig::default())
    }

    pub fn with_config(
        addr: SocketAddr,
        routes: RouteTable,
        snippets: Vec<Snippet>,
        config: HttpServerConfig,
    ) -> Self {
        Self {
            addr,
            routes,
            snippets: Arc::new(snippets),
            config,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the complete router
    pub fn router(&self) -> Router {
        let mut router = script_router(&self.routes).route("/health", get(health_handler));

        if let Some(dir) = &self.config.site_dir {
            let site = tower::ServiceBuilder::new()
                .layer(SnippetInjectionLayer::with_config(
                    self.snippets.clone(),
                    self.config.injection.clone(),
                ))
                .service(ServeDir::new(dir));
            router = router.fallback_service(site);
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the process stops
    pub async fn start(self) -> Result<()> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("HTTP server listening on {}", listener.local_addr()?);
        info!(
            "  {} tracking route(s), {} snippet(s)",
            self.routes.len(),
            self.snippets.len()
        );
        if let Some(dir) = &self.config.site_dir {
            info!("  Serving site from {}", dir.display());
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "OK"
}
