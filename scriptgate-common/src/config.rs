//! Configuration types for `scriptgate`
//!
//! The tracking configuration is operator-supplied YAML:
//!
//! ```yaml
//! providers:
//!   GoogleAnalytics:
//!     account: UA-123
//! ```
//!
//! A missing `providers` key falls back to an empty mapping. An explicit
//! `providers: ~` disables every provider.

use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_UPSTREAM_RETRIES, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::error::{Result, TrackingError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Settings of a single provider (`providers.<Name>`).
pub type ProviderConfig = serde_json::Map<String, Value>;

/// Global tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Provider name to provider settings. `None` disables every provider.
    #[serde(default = "default_providers")]
    pub providers: Option<BTreeMap<String, Value>>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_providers() -> Option<BTreeMap<String, Value>> {
    Some(BTreeMap::new())
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

impl TrackingConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document means "no configuration supplied".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TrackingError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Whether `name` appears in the `providers` mapping.
    pub fn is_provider_listed(&self, name: &str) -> bool {
        self.providers
            .as_ref()
            .is_some_and(|providers| providers.contains_key(name))
    }

    /// Names listed in the `providers` mapping.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers
            .as_ref()
            .map(|providers| providers.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Settings for `name`. A null entry reads as an empty mapping.
    pub fn provider_config(&self, name: &str) -> Result<ProviderConfig> {
        let entry = self
            .providers
            .as_ref()
            .and_then(|providers| providers.get(name))
            .ok_or_else(|| TrackingError::ProviderNotConfigured(name.to_string()))?;

        match entry {
            Value::Null => Ok(ProviderConfig::new()),
            Value::Object(map) => Ok(map.clone()),
            other => Err(TrackingError::Config(format!(
                "providers.{name} must be a mapping, found {other}"
            ))),
        }
    }

    /// Reject provider names that no implementation handles.
    pub fn validate(&self, known: &[&str]) -> Result<()> {
        for name in self.provider_names() {
            if !known.contains(&name) {
                return Err(TrackingError::UnknownProvider(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Shared, replaceable view of the tracking configuration.
///
/// Providers hold a clone of the handle and read through it on every call.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<TrackingConfig>>,
}

impl ConfigHandle {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Run `f` against the current configuration.
    pub fn read<R>(&self, f: impl FnOnce(&TrackingConfig) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Swap in a new configuration.
    pub fn replace(&self, config: TrackingConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
    }
}

impl From<TrackingConfig> for ConfigHandle {
    fn from(config: TrackingConfig) -> Self {
        Self::new(config)
    }
}

/// Upstream fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for a single upstream attempt
    pub timeout: Duration,
    /// Additional attempts after the first failure
    pub retries: u32,
    /// How long a fetched script is reused; zero disables caching
    pub cache_ttl: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            retries: DEFAULT_UPSTREAM_RETRIES,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl FetchConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(TrackingError::Config("upstream timeout must be > 0".into()));
        }
        Ok(())
    }

    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}
