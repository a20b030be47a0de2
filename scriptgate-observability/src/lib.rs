pub mod metrics;
pub mod tracing;

pub use metrics::{
    gather_metrics, init_metrics, metrics_enabled, tracking_metrics, TrackingMetrics, REGISTRY,
};
pub use tracing::{env_filter, init_tracing, shutdown_tracing, TracingConfig};

/// Basic initialization for minimal overhead
pub fn init_basic_observability(service_name: &str, enable_tracing: bool, enable_metrics: bool) {
    if enable_metrics {
        init_metrics();
    }

    if enable_tracing {
        if let Err(e) = init_tracing(TracingConfig::from_env(service_name)) {
            eprintln!("Failed to initialize tracing: {e}");
        }
    } else {
        init_minimal_logging();
    }
}

/// Minimal logging setup without metrics or OpenTelemetry infrastructure.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_minimal_logging() {
    use tracing_subscriber::prelude::*;

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Router exposing `/metrics` and `/health/ready`
#[cfg(feature = "axum")]
pub fn metrics_router() -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/metrics", get(|| async { gather_metrics() }))
        .route("/health/ready", get(|| async { "OK" }))
}

/// Serve [`metrics_router`] on `addr` until the task is dropped
#[cfg(feature = "axum")]
pub async fn serve_metrics(addr: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::tracing::info!("Metrics server listening on http://{}", addr);
    axum::serve(listener, metrics_router()).await
}
