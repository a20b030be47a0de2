use crate::builtin::GoogleAnalytics;
use crate::context::ProviderContext;
use crate::routes::RouteTable;
use crate::snippet::Snippet;
use crate::traits::{Provider, ProviderDescriptor};
use scriptgate_common::TrackingConfig;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Every provider variant scriptgate knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GoogleAnalytics,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::GoogleAnalytics];

    pub fn descriptor(self) -> &'static ProviderDescriptor {
        match self {
            ProviderKind::GoogleAnalytics => &GoogleAnalytics::DESCRIPTOR,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Instantiate the variant
    pub fn build(self, context: ProviderContext) -> Arc<dyn Provider> {
        match self {
            ProviderKind::GoogleAnalytics => Arc::new(GoogleAnalytics::new(context)),
        }
    }
}

/// Coordinates the known providers: decides which are enabled and hands out
/// their routes and page snippets.
///
/// The enabled set is computed once, on first use, and never recomputed. A
/// configuration change made through the [`ConfigHandle`](scriptgate_common::ConfigHandle)
/// afterwards only takes effect with a new extension.
pub struct TrackingExtension {
    context: ProviderContext,
    kinds: Vec<ProviderKind>,
    enabled: OnceLock<Vec<Arc<dyn Provider>>>,
}

impl TrackingExtension {
    pub fn new(context: ProviderContext) -> Self {
        Self::with_kinds(context, ProviderKind::ALL)
    }

    pub fn with_kinds(context: ProviderContext, kinds: &[ProviderKind]) -> Self {
        Self {
            context,
            kinds: kinds.to_vec(),
            enabled: OnceLock::new(),
        }
    }

    /// Build the extension and compute the enabled set immediately
    pub fn boot(context: ProviderContext) -> Self {
        let extension = Self::new(context);
        let enabled = extension.enabled_providers().len();
        info!("Tracking extension ready with {} enabled provider(s)", enabled);
        extension
    }

    /// Baseline configuration when the operator supplies none
    pub fn default_config() -> TrackingConfig {
        TrackingConfig::default()
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    pub fn kinds(&self) -> &[ProviderKind] {
        &self.kinds
    }

    /// Fresh instances of every known provider, enabled or not
    pub fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.kinds
            .iter()
            .map(|kind| kind.build(self.context.clone()))
            .collect()
    }

    /// Providers that are enabled and configured. Memoized.
    pub fn enabled_providers(&self) -> &[Arc<dyn Provider>] {
        self.enabled.get_or_init(|| {
            let mut enabled = Vec::new();
            for provider in self.providers() {
                // Enablement gates the configuration check so providers the
                // operator never listed produce no warnings.
                if !provider.is_enabled() {
                    debug!("Tracking provider {} not enabled", provider.name());
                    continue;
                }
                if !provider.is_configured() {
                    continue;
                }
                info!("Enabling tracking provider: {}", provider.name());
                enabled.push(provider);
            }
            enabled
        })
    }

    /// Register the proxy route of every enabled provider
    pub fn register_frontend_routes(&self, routes: &mut RouteTable) {
        for provider in self.enabled_providers() {
            Arc::clone(provider).register_route(routes);
        }
    }

    /// One end-of-body frontend snippet per enabled provider
    pub fn register_assets(&self) -> Vec<Snippet> {
        self.enabled_providers()
            .iter()
            .map(|provider| Snippet::for_provider(Arc::clone(provider)))
            .collect()
    }
}

impl std::fmt::Debug for TrackingExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingExtension")
            .field("kinds", &self.kinds)
            .field("enabled", &self.enabled.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::{Location, Zone};

    fn extension(yaml: &str) -> TrackingExtension {
        let config = TrackingConfig::from_yaml_str(yaml).unwrap();
        let ctx = ProviderContext::with_defaults(config, "https://example.com").unwrap();
        TrackingExtension::new(ctx)
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(
            ProviderKind::from_name("GoogleAnalytics"),
            Some(ProviderKind::GoogleAnalytics)
        );
        assert_eq!(ProviderKind::from_name("googleanalytics"), None);
        assert_eq!(ProviderKind::known_names(), vec!["GoogleAnalytics"]);
    }

    #[test]
    fn test_configured_provider_is_enabled() {
        let ext = extension("providers:\n  GoogleAnalytics:\n    account: UA-123\n");
        let enabled = ext.enabled_providers();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name(), "GoogleAnalytics");
    }

    #[test]
    fn test_misconfigured_provider_is_excluded() {
        let ext = extension("providers:\n  GoogleAnalytics: {}\n");
        assert!(ext.enabled_providers().is_empty());
    }

    #[test]
    fn test_null_providers_yields_nothing() {
        let ext = extension("providers: ~\n");
        assert!(ext.enabled_providers().is_empty());

        let mut routes = RouteTable::new();
        ext.register_frontend_routes(&mut routes);
        assert!(routes.is_empty());
        assert!(ext.register_assets().is_empty());
    }

    #[test]
    fn test_default_config_enables_nothing() {
        let config = TrackingExtension::default_config();
        assert_eq!(config.providers.as_ref().map(std::collections::BTreeMap::len), Some(0));

        let ctx = ProviderContext::with_defaults(config, "https://example.com").unwrap();
        assert!(TrackingExtension::new(ctx).enabled_providers().is_empty());
    }

    #[test]
    fn test_enabled_providers_is_memoized() {
        let ext = extension("providers:\n  GoogleAnalytics:\n    account: UA-123\n");
        let first = ext.enabled_providers();

        // Later config changes do not affect the computed set.
        ext.context().config().replace(TrackingConfig { providers: None });
        let second = ext.enabled_providers();

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.len(), 1);
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn test_register_frontend_routes() {
        let ext = extension("providers:\n  GoogleAnalytics:\n    account: UA-123\n");
        let mut routes = RouteTable::new();
        ext.register_frontend_routes(&mut routes);

        assert_eq!(routes.len(), 1);
        assert_eq!(
            routes.path_for("tracking_googleanalytics"),
            Some("/tracking/googleanalytics")
        );
    }

    #[test]
    fn test_register_assets() {
        let ext = extension("providers:\n  GoogleAnalytics:\n    account: UA-123\n");
        let assets = ext.register_assets();

        assert_eq!(assets.len(), 1);
        let snippet = &assets[0];
        assert_eq!(snippet.location(), Location::EndOfBody);
        assert_eq!(snippet.priority(), 50);
        assert_eq!(snippet.zone(), Zone::Frontend);
        assert!(snippet.render().unwrap().contains("UA-123"));
    }

    #[test]
    fn test_with_no_kinds() {
        let config =
            TrackingConfig::from_yaml_str("providers:\n  GoogleAnalytics:\n    account: UA-1\n")
                .unwrap();
        let ctx = ProviderContext::with_defaults(config, "https://example.com").unwrap();
        let ext = TrackingExtension::with_kinds(ctx, &[]);
        assert!(ext.providers().is_empty());
        assert!(ext.enabled_providers().is_empty());
    }
}
