//! Provider enablement and snippet tests
//!
//! Exercises the extension through the embeddable gateway.

use super::{ga_config, local_builder};
use scriptgate::common::{TrackingConfig, TrackingError};
use scriptgate::provider::{Location, Zone};

/// A null providers mapping disables everything
#[test]
fn test_null_providers_enable_nothing() {
    let tracking = TrackingConfig::from_yaml_str("providers: ~\n").unwrap();
    let gateway = local_builder(tracking).build().unwrap();

    for provider in gateway.extension().providers() {
        assert!(!provider.is_enabled(), "{} enabled", provider.name());
    }
    assert!(gateway.extension().enabled_providers().is_empty());
    assert!(gateway.routes().is_empty());
    assert!(gateway.snippets().is_empty());
}

/// A configured account enables Google Analytics with an absolute proxy URL
#[test]
fn test_google_analytics_scenario() {
    let gateway = local_builder(ga_config("UA-123", None)).build().unwrap();
    let extension = gateway.extension();

    let enabled = extension.enabled_providers();
    assert_eq!(enabled.len(), 1);
    let ga = &enabled[0];
    assert_eq!(ga.name(), "GoogleAnalytics");
    assert!(ga.is_enabled());
    assert!(ga.is_configured());

    let snippet = ga.fetch_snippet().unwrap();
    assert!(snippet.contains("UA-123"));
    assert!(snippet.contains("https://www.example.com/tracking/googleanalytics"));

    let routes = gateway.routes();
    assert_eq!(
        routes.path_for("tracking_googleanalytics"),
        Some("/tracking/googleanalytics")
    );

    let snippets = gateway.snippets();
    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].location(), Location::EndOfBody);
    assert_eq!(snippets[0].priority(), 50);
    assert_eq!(snippets[0].zone(), Zone::Frontend);
}

/// Listed but missing its account: excluded, no route, no snippet
#[test]
fn test_missing_account_excludes_provider() {
    let tracking = TrackingConfig::from_yaml_str("providers:\n  GoogleAnalytics: {}\n").unwrap();
    let gateway = local_builder(tracking).build().unwrap();

    let providers = gateway.extension().providers();
    let ga = &providers[0];
    assert!(ga.is_enabled());
    assert!(!ga.is_configured());

    match ga.check_configuration() {
        Err(TrackingError::ConfigurationInvalid { provider, key }) => {
            assert_eq!(provider, "GoogleAnalytics");
            assert_eq!(key, "account");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(gateway.extension().enabled_providers().is_empty());
    assert!(gateway.routes().is_empty());
}

/// A null account counts as missing
#[test]
fn test_null_account_excludes_provider() {
    let tracking =
        TrackingConfig::from_yaml_str("providers:\n  GoogleAnalytics:\n    account: ~\n")
            .unwrap();
    let gateway = local_builder(tracking).build().unwrap();
    assert!(gateway.extension().enabled_providers().is_empty());
}

/// The enabled set is computed once per extension
#[test]
fn test_enabled_set_is_memoized() {
    let gateway = local_builder(ga_config("UA-1", None)).build().unwrap();
    let extension = gateway.extension();

    let first = extension.enabled_providers();
    extension
        .context()
        .config()
        .replace(TrackingConfig::from_yaml_str("providers: ~\n").unwrap());
    let second = extension.enabled_providers();

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.len(), 1);
}

/// Unknown provider names fail at startup
#[test]
fn test_unknown_provider_rejected_at_build() {
    let tracking =
        TrackingConfig::from_yaml_str("providers:\n  Matomo:\n    site_id: 1\n").unwrap();
    let err = local_builder(tracking).build().unwrap_err();
    assert!(matches!(err, TrackingError::UnknownProvider(name) if name == "Matomo"));
}

/// Loading the configuration from a YAML file
#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracking.yaml");
    std::fs::write(&path, "providers:\n  GoogleAnalytics:\n    account: UA-FILE\n").unwrap();

    let gateway = scriptgate::Gateway::builder()
        .config_file(&path)
        .build()
        .unwrap();
    let page = gateway.render_page("<body></body>", "/");
    assert!(page.contains("UA-FILE"));
}
