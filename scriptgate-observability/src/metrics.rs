use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

/// Registry holding every scriptgate metric
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static METRICS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Metrics recorded by the proxy routes and the snippet injector
pub struct TrackingMetrics {
    /// Proxy requests by provider and outcome (`ok`, `upstream_error`)
    pub proxy_requests: IntCounterVec,
    /// Time spent fetching the upstream script, by provider
    pub upstream_fetch_duration: HistogramVec,
    /// Snippets written into HTML pages
    pub snippets_injected: IntCounter,
    /// Snippets that failed to render and were skipped
    pub snippet_failures: IntCounterVec,
}

static TRACKING_METRICS: LazyLock<TrackingMetrics> = LazyLock::new(|| {
    let proxy_requests = IntCounterVec::new(
        Opts::new(
            "scriptgate_proxy_requests_total",
            "Proxied tracking script requests",
        ),
        &["provider", "outcome"],
    )
    .unwrap();

    let upstream_fetch_duration = HistogramVec::new(
        HistogramOpts::new(
            "scriptgate_upstream_fetch_duration_seconds",
            "Upstream tracking script fetch latency",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["provider"],
    )
    .unwrap();

    let snippets_injected = IntCounter::new(
        "scriptgate_snippets_injected_total",
        "Tracking snippets injected into pages",
    )
    .unwrap();

    let snippet_failures = IntCounterVec::new(
        Opts::new(
            "scriptgate_snippet_failures_total",
            "Tracking snippets that failed to render",
        ),
        &["provider"],
    )
    .unwrap();

    REGISTRY.register(Box::new(proxy_requests.clone())).unwrap();
    REGISTRY
        .register(Box::new(upstream_fetch_duration.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(snippets_injected.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(snippet_failures.clone()))
        .unwrap();

    TrackingMetrics {
        proxy_requests,
        upstream_fetch_duration,
        snippets_injected,
        snippet_failures,
    }
});

/// Register the metrics and mark them as enabled
pub fn init_metrics() {
    LazyLock::force(&TRACKING_METRICS);
    METRICS_ENABLED.store(true, Ordering::Relaxed);
}

pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}

/// Access the metric handles (registers them on first use)
pub fn tracking_metrics() -> &'static TrackingMetrics {
    &TRACKING_METRICS
}

/// Render every registered metric in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
