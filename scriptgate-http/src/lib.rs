pub mod inject;
pub mod proxy;
pub mod server;

pub use inject::{
    inject_snippets, render_snippets, zone_for_path, InjectionConfig, SnippetInjectionLayer,
};
pub use proxy::{script_router, upstream_failure_response};
pub use server::{HttpServerConfig, TrackingServer};
