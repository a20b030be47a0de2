//! Serve subcommand implementation

use super::GatewayArgs;
use anyhow::Result;
use clap::Args;
use scriptgate_observability::{init_basic_observability, init_minimal_logging, serve_metrics};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8080", env = "SCRIPTGATE_BIND")]
    pub bind: SocketAddr,

    /// Static site to serve with snippets injected into HTML pages
    #[arg(long, env = "SCRIPTGATE_SITE_DIR")]
    pub site_dir: Option<PathBuf>,

    /// Enable tracing (metrics is separate via --metrics)
    #[arg(long, env = "SCRIPTGATE_OBSERVABILITY")]
    pub observability: bool,

    /// Enable metrics endpoint
    #[arg(long, env = "SCRIPTGATE_METRICS")]
    pub metrics: bool,

    /// Metrics bind address
    #[arg(long, default_value = "0.0.0.0:9090", env = "SCRIPTGATE_METRICS_BIND")]
    pub metrics_bind: SocketAddr,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let enable_tracing = args.observability;
    let enable_metrics = args.metrics;

    if enable_tracing || enable_metrics {
        init_basic_observability("scriptgate", enable_tracing, enable_metrics);
    } else {
        init_minimal_logging();
    }

    if enable_metrics {
        let metrics_addr = args.metrics_bind;
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(metrics_addr).await {
                error!("Metrics server error on {}: {}", metrics_addr, e);
            }
        });
    }

    info!("Starting scriptgate v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = args.gateway.builder().bind(args.bind);
    if let Some(dir) = &args.site_dir {
        builder = builder.site_dir(dir.clone());
    }
    let mut gateway = builder.build()?;

    for route in &gateway.routes() {
        info!("  {} -> {}", route.path, route.provider.remote_script_url());
    }

    gateway.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    gateway.shutdown().await?;

    if enable_tracing {
        scriptgate_observability::shutdown_tracing();
    }
    Ok(())
}
