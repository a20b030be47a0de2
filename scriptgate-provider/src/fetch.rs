//! Upstream script fetching with timeout, retry and an in-memory cache.

use bytes::Bytes;
use scriptgate_common::{FetchConfig, Result, TrackingError};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CachedScript {
    body: Bytes,
    fetched_at: Instant,
}

/// HTTP client for remote tracking scripts.
///
/// Each attempt is bounded by `FetchConfig::timeout`. Connection errors,
/// timeouts and 5xx responses are retried up to `FetchConfig::retries` times.
/// When every attempt fails and an expired copy is cached, the expired copy is
/// served instead of the error.
#[derive(Debug)]
pub struct ScriptFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    cache: RwLock<HashMap<String, CachedScript>>,
}

impl ScriptFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("scriptgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackingError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `url`, answering from the cache while the entry is fresh.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        if self.config.cache_enabled() {
            if let Some(body) = self.cached(url, false).await {
                debug!(url, "Serving tracking script from cache");
                return Ok(body);
            }
        }

        match self.fetch_with_retries(url).await {
            Ok(body) => {
                if self.config.cache_enabled() {
                    self.cache.write().await.insert(
                        url.to_string(),
                        CachedScript {
                            body: body.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Ok(body)
            }
            Err(e) => {
                if let Some(stale) = self.cached(url, true).await {
                    warn!(url, error = %e, "Upstream unavailable, serving stale tracking script");
                    return Ok(stale);
                }
                Err(e)
            }
        }
    }

    async fn cached(&self, url: &str, allow_stale: bool) -> Option<Bytes> {
        let cache = self.cache.read().await;
        let entry = cache.get(url)?;
        if allow_stale || entry.fetched_at.elapsed() < self.config.cache_ttl {
            Some(entry.body.clone())
        } else {
            None
        }
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<Bytes> {
        let attempts = self.config.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts && is_retryable(&e) => {
                    warn!(url, attempt, error = %e, "Upstream script fetch failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "Upstream script fetch failed");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| upstream_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackingError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| upstream_error(url, &e))
    }
}

fn is_retryable(err: &TrackingError) -> bool {
    match err {
        TrackingError::Upstream { .. } | TrackingError::Timeout(_) => true,
        TrackingError::UpstreamStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

fn upstream_error(url: &str, err: &reqwest::Error) -> TrackingError {
    if err.is_timeout() {
        TrackingError::Timeout(format!("upstream fetch of {url} timed out"))
    } else {
        TrackingError::Upstream {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
