//! Collaborators handed to every provider at construction.

use crate::fetch::ScriptFetcher;
use crate::render::SnippetRenderer;
use scriptgate_common::{ConfigHandle, FetchConfig, Result, TrackingConfig};
use std::sync::Arc;
use url::Url;

/// Configuration view, template renderer, upstream fetcher and the public
/// origin used to build absolute URLs.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    config: ConfigHandle,
    renderer: Arc<SnippetRenderer>,
    fetcher: Arc<ScriptFetcher>,
    public_url: Url,
}

impl ProviderContext {
    pub fn new(
        config: ConfigHandle,
        renderer: Arc<SnippetRenderer>,
        fetcher: Arc<ScriptFetcher>,
        public_url: Url,
    ) -> Self {
        Self {
            config,
            renderer,
            fetcher,
            public_url,
        }
    }

    /// Context with the built-in templates and default fetch settings.
    pub fn with_defaults(config: TrackingConfig, public_url: &str) -> Result<Self> {
        Ok(Self::new(
            ConfigHandle::new(config),
            Arc::new(SnippetRenderer::new()?),
            Arc::new(ScriptFetcher::new(FetchConfig::default())?),
            Url::parse(public_url)?,
        ))
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn renderer(&self) -> &SnippetRenderer {
        &self.renderer
    }

    pub fn fetcher(&self) -> &ScriptFetcher {
        &self.fetcher
    }

    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    /// Absolute URL for an application path, keeping any base path of the
    /// public URL (`https://example.com/site` + `/tracking/x`).
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.public_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_joins_path() {
        let ctx = ProviderContext::with_defaults(TrackingConfig::default(), "https://example.com")
            .unwrap();
        assert_eq!(
            ctx.absolute_url("/tracking/googleanalytics"),
            "https://example.com/tracking/googleanalytics"
        );
    }

    #[test]
    fn test_absolute_url_keeps_base_path() {
        let ctx =
            ProviderContext::with_defaults(TrackingConfig::default(), "https://example.com/site/")
                .unwrap();
        assert_eq!(
            ctx.absolute_url("tracking/googleanalytics"),
            "https://example.com/site/tracking/googleanalytics"
        );
    }

    #[test]
    fn test_invalid_public_url() {
        let result = ProviderContext::with_defaults(TrackingConfig::default(), "not a url");
        assert!(result.is_err());
    }
}
