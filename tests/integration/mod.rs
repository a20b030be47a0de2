#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for scriptgate
//!
//! These tests run a real gateway on a loopback port against a mocked
//! upstream script host.

mod extension_test;
mod proxy_test;
mod site_test;

use scriptgate::common::TrackingConfig;
use scriptgate::{Gateway, GatewayBuilder};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::sleep;

/// Tracking configuration enabling Google Analytics, optionally pointing the
/// proxy at a mock upstream
pub fn ga_config(account: &str, script_url: Option<&str>) -> TrackingConfig {
    let mut yaml = format!("providers:\n  GoogleAnalytics:\n    account: {account}\n");
    if let Some(url) = script_url {
        yaml.push_str(&format!("    script_url: {url}\n"));
    }
    TrackingConfig::from_yaml_str(&yaml).unwrap()
}

/// Builder bound to an ephemeral loopback port
pub fn local_builder(tracking: TrackingConfig) -> GatewayBuilder {
    Gateway::builder()
        .tracking(tracking)
        .bind("127.0.0.1:0".parse().unwrap())
        .public_url("https://www.example.com")
}

/// Start `builder` and wait until it accepts connections
pub async fn start(builder: GatewayBuilder) -> (Gateway, SocketAddr) {
    let mut gateway = builder.build().expect("gateway should build");
    let addr = gateway.start().await.expect("gateway should start");
    assert!(
        wait_for_server(addr, Duration::from_secs(5)).await,
        "gateway did not start listening"
    );
    (gateway, addr)
}

/// Wait for a server to start listening
pub async fn wait_for_server(addr: SocketAddr, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Create a reqwest client configured for testing (no proxy, direct connection)
pub fn make_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build reqwest client")
}
