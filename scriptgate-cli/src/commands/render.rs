//! Render subcommand implementation

use super::GatewayArgs;
use anyhow::{Context, Result};
use clap::Args;
use scriptgate_observability::init_minimal_logging;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// HTML file to inject snippets into
    pub input: PathBuf,

    /// Request path the page is served at; decides frontend or backend zone
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Write the result here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    init_minimal_logging();

    let gateway = args.gateway.builder().build()?;
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let page = gateway.render_page(&html, &args.path);

    match &args.output {
        Some(path) => {
            std::fs::write(path, page)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{page}"),
    }
    Ok(())
}
