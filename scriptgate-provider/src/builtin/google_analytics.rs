//! Google Analytics (classic `ga.js`) provider

use crate::context::ProviderContext;
use crate::traits::{Provider, ProviderDescriptor};
use async_trait::async_trait;
use scriptgate_common::Result;
use serde_json::Value;

/// Serves `ga.js` through the proxy route and renders the `_gaq` loader
pub struct GoogleAnalytics {
    context: ProviderContext,
}

impl GoogleAnalytics {
    pub const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
        name: "GoogleAnalytics",
        required_config_keys: &["account"],
        remote_script_url: "https://ssl.google-analytics.com/ga.js",
    };

    pub fn new(context: ProviderContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Provider for GoogleAnalytics {
    fn descriptor(&self) -> &'static ProviderDescriptor {
        &Self::DESCRIPTOR
    }

    fn context(&self) -> &ProviderContext {
        &self.context
    }

    fn fetch_snippet(&self) -> Result<String> {
        let config = self.fetch_config()?;
        let mut data = tera::Context::new();
        data.insert("account", config.get("account").unwrap_or(&Value::Null));

        self.render_snippet(data)
    }
}
