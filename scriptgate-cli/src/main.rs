//! scriptgate CLI
//!
//! Serves third-party tracking scripts from your own origin.

// Use mimalloc as the global allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scriptgate",
    author,
    version,
    about = "First-party proxy for third-party tracking scripts",
    long_about = "scriptgate serves analytics loaders such as Google Analytics from your own origin\n\
                  and injects the matching snippet into your HTML pages.",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the proxy routes and optionally a static site
    Serve(commands::serve::ServeArgs),

    /// Validate the configuration and show provider status
    Check(commands::check::CheckArgs),

    /// Inject tracking snippets into an HTML file
    Render(commands::render::RenderArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Check(args) => commands::check::run(&args),
        Commands::Render(args) => commands::render::run(&args),
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
