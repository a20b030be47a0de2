//! # scriptgate Provider System
//!
//! Tracking providers and the extension that coordinates them.
//!
//! A provider knows its name, the configuration keys it needs and the remote
//! script it serves. The [`TrackingExtension`] keeps the providers that are both
//! listed in the configuration and fully configured, then hands out one proxy
//! route and one page snippet for each.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriptgate_common::TrackingConfig;
//! use scriptgate_provider::{ProviderContext, RouteTable, TrackingExtension};
//!
//! # fn main() -> scriptgate_common::Result<()> {
//! let config = TrackingConfig::from_yaml_str(
//!     "providers:\n  GoogleAnalytics:\n    account: UA-123\n",
//! )?;
//! let context = ProviderContext::with_defaults(config, "https://example.com")?;
//! let extension = TrackingExtension::boot(context);
//!
//! let mut routes = RouteTable::new();
//! extension.register_frontend_routes(&mut routes);
//!
//! for snippet in extension.register_assets() {
//!     println!("{}", snippet.render()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Adding a provider
//!
//! Implement [`Provider`] with a `'static` [`ProviderDescriptor`], add a
//! `providers/<Name>` template to the [`SnippetRenderer`] and a variant to
//! [`ProviderKind`].

pub mod builtin;
pub mod context;
pub mod fetch;
pub mod registry;
pub mod render;
pub mod routes;
pub mod snippet;
pub mod traits;

pub use context::ProviderContext;
pub use fetch::ScriptFetcher;
pub use registry::{ProviderKind, TrackingExtension};
pub use render::{template_name, SnippetRenderer};
pub use routes::{RouteTable, ScriptRoute};
pub use snippet::{Location, Snippet, Zone};
pub use traits::*;
