use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use scriptgate_common::constants::{FAILURE_CACHE_CONTROL, FAILURE_SCRIPT_BODY};
use scriptgate_common::SCRIPT_CONTENT_TYPE;
use scriptgate_provider::{Provider, ProxyScript, RouteTable};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Pre-allocated bytes for common error bodies (avoids allocation in the error path).
const MSG_INTERNAL_ERROR: &[u8] = b"Internal error";

/// Router with one GET route per registered provider script
pub fn script_router(routes: &RouteTable) -> Router {
    let mut router = Router::new();
    for route in routes {
        let provider = Arc::clone(&route.provider);
        debug!("Mounting {} at {}", route.name, route.path);
        router = router.route(
            &route.path,
            get(move || serve_script(Arc::clone(&provider))),
        );
    }
    router
}

/// Fetch the provider's script and turn the outcome into a response
pub async fn serve_script(provider: Arc<dyn Provider>) -> Response {
    let started = Instant::now();
    let result = provider.fetch_proxy_script().await;

    #[cfg(feature = "metrics")]
    {
        use scriptgate_observability::{metrics_enabled, tracking_metrics};
        if metrics_enabled() {
            let metrics = tracking_metrics();
            metrics
                .upstream_fetch_duration
                .with_label_values(&[provider.name()])
                .observe(started.elapsed().as_secs_f64());
            let outcome = if result.is_ok() { "ok" } else { "upstream_error" };
            metrics
                .proxy_requests
                .with_label_values(&[provider.name(), outcome])
                .inc();
        }
    }

    match result {
        Ok(script) => {
            debug!(
                provider = provider.name(),
                bytes = script.body.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Proxied tracking script"
            );
            script_response(script)
        }
        Err(e) if e.is_upstream() => {
            error!(provider = provider.name(), error = %e, "Failed to proxy tracking script");
            upstream_failure_response()
        }
        Err(e) => {
            error!(provider = provider.name(), error = %e, "Tracking script route failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// 200 with the script body and the proxy headers
pub fn script_response(script: ProxyScript) -> Response {
    (
        [
            (header::CONTENT_TYPE, script.content_type),
            (header::CACHE_CONTROL, script.cache_control),
        ],
        script.body,
    )
        .into_response()
}

/// 502 served when the upstream script cannot be fetched. Short cache
/// lifetime so browsers retry soon, body is valid (empty) JavaScript.
pub fn upstream_failure_response() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [
            (header::CONTENT_TYPE, SCRIPT_CONTENT_TYPE),
            (header::CACHE_CONTROL, FAILURE_CACHE_CONTROL),
        ],
        Bytes::from_static(FAILURE_SCRIPT_BODY.as_bytes()),
    )
        .into_response()
}

/// Builds a plain-text error response.
/// Uses static bytes for common messages to avoid allocation.
pub fn error_response(status: StatusCode, msg: &str) -> Response {
    let bytes = if msg == "Internal error" {
        Bytes::from_static(MSG_INTERNAL_ERROR)
    } else {
        Bytes::copy_from_slice(msg.as_bytes())
    };
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        bytes,
    )
        .into_response()
}
