//! Defaults shared by the provider, HTTP and CLI crates.
//!
//! Use these constants instead of magic values so the proxy routes, headers and
//! placement metadata stay consistent everywhere.

/// Prefix of every proxy route (`/tracking/<provider>`).
pub const TRACKING_BASE_PATH: &str = "/tracking/";

/// Prefix of every proxy route name (`tracking_<provider>`).
pub const TRACKING_ROUTE_NAME_PREFIX: &str = "tracking_";

/// Content type served for proxied scripts.
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Cache lifetime advertised for a successfully proxied script (one day).
pub const SCRIPT_CACHE_CONTROL: &str = "max-age=86400";

/// Cache lifetime advertised when the upstream script could not be fetched.
pub const FAILURE_CACHE_CONTROL: &str = "max-age=60";

/// Body served when the upstream script could not be fetched.
pub const FAILURE_SCRIPT_BODY: &str = "/* tracking script unavailable */";

/// Priority given to every tracking snippet.
pub const SNIPPET_PRIORITY: i32 = 50;

/// Default port for the HTTP server.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default port for the metrics endpoint (e.g. Prometheus).
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Default bind address for the HTTP server as a string (`0.0.0.0:8080`).
pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0:8080";

/// Default public URL used to build absolute script URLs.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

/// Request paths under this prefix belong to the backend zone.
pub const DEFAULT_BACKEND_PREFIX: &str = "/admin";

/// Default per-attempt timeout for upstream script fetches, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Default number of retries after a failed upstream fetch.
pub const DEFAULT_UPSTREAM_RETRIES: u32 = 1;

/// Default lifetime of the in-memory script cache, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
