//! Check subcommand implementation

use super::GatewayArgs;
use anyhow::{Context, Result};
use clap::Args;
use scriptgate::Gateway;
use scriptgate_observability::init_minimal_logging;
use std::fmt::Write;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub gateway: GatewayArgs,
}

pub fn run(args: &CheckArgs) -> Result<()> {
    init_minimal_logging();

    let gateway = args
        .gateway
        .builder()
        .build()
        .context("invalid scriptgate configuration")?;
    print!("{}", report(&gateway));
    Ok(())
}

/// One line per known provider with its status and proxy URL
pub fn report(gateway: &Gateway) -> String {
    let extension = gateway.extension();
    let enabled: Vec<&str> = extension
        .enabled_providers()
        .iter()
        .map(|p| p.name())
        .collect();

    let mut out = String::new();
    for provider in extension.providers() {
        let status = if enabled.contains(&provider.name()) {
            "enabled"
        } else if !provider.is_enabled() {
            "not listed"
        } else {
            "misconfigured"
        };
        let _ = write!(out, "{:<20} {:<14}", provider.name(), status);
        if status == "enabled" {
            let url = extension.context().absolute_url(&provider.script_route());
            let _ = write!(out, " {url} <- {}", provider.remote_script_url());
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{} of {} provider(s) enabled", enabled.len(), extension.kinds().len());
    out
}
