//! Common utilities and types for `scriptgate`

pub mod config;
pub mod constants;
pub mod error;

pub use config::{ConfigHandle, FetchConfig, ProviderConfig, TrackingConfig};
pub use constants::{
    DEFAULT_BACKEND_PREFIX, DEFAULT_HTTP_BIND, DEFAULT_HTTP_PORT, DEFAULT_METRICS_PORT,
    DEFAULT_PUBLIC_URL, SCRIPT_CACHE_CONTROL, SCRIPT_CONTENT_TYPE, SNIPPET_PRIORITY,
    TRACKING_BASE_PATH,
};
pub use error::{Result, TrackingError};
