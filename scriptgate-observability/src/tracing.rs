//! Log and span output.
//!
//! Events always go to stdout through `tracing-subscriber`. When an OTLP
//! endpoint is configured, spans are also exported over gRPC.

use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use std::sync::OnceLock;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when `RUST_LOG` is unset. Upstream client internals are noisy
/// at `info` on every proxied fetch.
pub const DEFAULT_FILTER: &str = "info,hyper_util=warn,reqwest=warn,tower_http=info";

/// Environment variable selecting JSON log lines (`1`, `true`)
pub const LOG_JSON_ENV: &str = "SCRIPTGATE_LOG_JSON";

const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

type FmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialization options for tracing
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name: String,
    /// gRPC collector endpoint; no span export when unset
    pub otlp_endpoint: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl TracingConfig {
    /// Settings from `OTEL_EXPORTER_OTLP_ENDPOINT` and `SCRIPTGATE_LOG_JSON`
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otlp_endpoint: std::env::var(OTLP_ENDPOINT_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            json: std::env::var(LOG_JSON_ENV).is_ok_and(|v| is_truthy(&v)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `RUST_LOG` when set, [`DEFAULT_FILTER`] otherwise
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn fmt_layer(json: bool) -> FmtLayer {
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_target(true)
            .boxed()
    }
}

fn otlp_tracer(endpoint: &str, service_name: &str) -> Result<SdkTracer, anyhow::Error> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .with_batch_exporter(exporter)
        .build();

    let tracer = provider.tracer("scriptgate");
    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider);
    Ok(tracer)
}

/// Initialize the tracing system with optional OTLP export
pub fn init_tracing(config: TracingConfig) -> Result<(), anyhow::Error> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let registry = Registry::default()
        .with(env_filter())
        .with(fmt_layer(config.json));

    match &config.otlp_endpoint {
        Some(endpoint) => {
            let tracer = otlp_tracer(endpoint, &config.service_name)?;
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
            tracing::info!(endpoint = %endpoint, "Exporting spans over OTLP");
        }
        None => registry.try_init()?,
    }

    tracing::info!(service = %config.service_name, "Tracing infrastructure initialized");
    Ok(())
}

/// Shutdown the tracing system and flush spans
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::error!("Failed to shutdown tracer provider: {}", e);
        }
    }
}
