pub mod check;
pub mod render;
pub mod serve;
pub mod version;

use clap::Args;
use scriptgate::{Gateway, GatewayBuilder};
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every command that builds a gateway
#[derive(Args, Debug)]
pub struct GatewayArgs {
    /// Tracking configuration file (YAML)
    #[arg(long, short = 'c', env = "SCRIPTGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Public origin of the application, used for absolute script URLs
    #[arg(long, default_value = "http://localhost:8080", env = "SCRIPTGATE_PUBLIC_URL")]
    pub public_url: String,

    /// Directory with providers/<Name>.html.tera template overrides
    #[arg(long, env = "SCRIPTGATE_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Paths under this prefix are backend pages and get no snippets
    #[arg(long, default_value = "/admin", env = "SCRIPTGATE_BACKEND_PREFIX")]
    pub backend_prefix: String,

    /// Per-attempt timeout for upstream script fetches
    #[arg(long, default_value_t = 10, env = "SCRIPTGATE_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// Retries after a failed upstream fetch
    #[arg(long, default_value_t = 1, env = "SCRIPTGATE_UPSTREAM_RETRIES")]
    pub upstream_retries: u32,

    /// How long fetched scripts are cached (0 disables the cache)
    #[arg(long, default_value_t = 3600, env = "SCRIPTGATE_CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,
}

impl GatewayArgs {
    pub fn builder(&self) -> GatewayBuilder {
        let mut builder = Gateway::builder()
            .public_url(self.public_url.clone())
            .backend_prefix(self.backend_prefix.clone())
            .upstream_timeout(Duration::from_secs(self.upstream_timeout_secs))
            .upstream_retries(self.upstream_retries)
            .cache_ttl(Duration::from_secs(self.cache_ttl_secs));

        if let Some(path) = &self.config {
            builder = builder.config_file(path.clone());
        }
        if let Some(dir) = &self.template_dir {
            builder = builder.template_dir(dir.clone());
        }
        builder
    }
}
