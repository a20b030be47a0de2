//! # scriptgate
//!
//! First-party proxy and page injection for third-party tracking scripts.
//!
//! ## Overview
//!
//! Analytics loaders such as Google Analytics' `ga.js` are often blocked or
//! slowed down when fetched from a third-party origin. scriptgate serves them
//! from the application's own origin under `/tracking/<provider>` and injects
//! the matching loader snippet into every frontend page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriptgate::prelude::*;
//!
//! # async fn example() -> scriptgate::Result<()> {
//! let tracking = TrackingConfig::from_yaml_str(
//!     "providers:\n  GoogleAnalytics:\n    account: UA-123\n",
//! )?;
//!
//! let mut gateway = Gateway::builder()
//!     .tracking(tracking)
//!     .public_url("https://www.example.com")
//!     .site_dir("./public")
//!     .build()?;
//!
//! gateway.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`scriptgate-common`] - Configuration, errors and shared constants
//! - [`scriptgate-provider`] - Provider trait, built-in providers, extension
//! - [`scriptgate-http`] - Proxy routes, snippet injection, HTTP server
//!
//! ## Re-exports
//!
//! This crate re-exports the most commonly used items from the subcrates
//! for convenience.

pub mod config;
pub mod gateway;

// Re-export subcrates
pub use scriptgate_common as common;
pub use scriptgate_http as http;
pub use scriptgate_provider as provider;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::common::{FetchConfig, Result, TrackingConfig, TrackingError};
    pub use crate::config::{GatewayConfig, TrackingSource};
    pub use crate::gateway::{Gateway, GatewayBuilder};
    pub use crate::provider::{
        Location, Provider, ProviderKind, RouteTable, Snippet, TrackingExtension, Zone,
    };
}

// Convenience re-exports at crate root
pub use common::{Result, TrackingError};
pub use config::{GatewayConfig, TrackingSource};
pub use gateway::{Gateway, GatewayBuilder};
