//! Snippet templates
//!
//! Uses Tera templates named `providers/<ProviderName>`. Built-in templates are
//! embedded; a template directory can override them with
//! `<dir>/providers/<ProviderName>.html.tera`.

use scriptgate_common::{Result, TrackingError};
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

const TEMPLATE_SUFFIX: &str = ".html.tera";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    "providers/GoogleAnalytics",
    include_str!("../templates/providers/GoogleAnalytics.html.tera"),
)];

/// Template id for a provider
pub fn template_name(provider: &str) -> String {
    format!("providers/{provider}")
}

/// Template registry holding all provider snippets
#[derive(Debug)]
pub struct SnippetRenderer {
    tera: Tera,
}

impl SnippetRenderer {
    /// Create a renderer with the embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        for (name, source) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, source)
                .map_err(|e| template_error(name, &e))?;
        }
        Ok(Self { tera })
    }

    /// Create a renderer whose templates can be overridden from `dir`
    pub fn with_template_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut renderer = Self::new()?;
        let providers_dir = dir.as_ref().join("providers");
        if !providers_dir.is_dir() {
            return Err(TrackingError::Config(format!(
                "template directory {} has no providers/ folder",
                dir.as_ref().display()
            )));
        }

        for entry in std::fs::read_dir(&providers_dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
                continue;
            };
            let Some(provider) = file_name.strip_suffix(TEMPLATE_SUFFIX) else {
                continue;
            };

            let source = std::fs::read_to_string(&path)?;
            debug!("Loading snippet template override: {}", path.display());
            renderer.add_raw_template(&template_name(provider), &source)?;
        }
        Ok(renderer)
    }

    /// Register or replace a template
    pub fn add_raw_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, source)
            .map_err(|e| template_error(name, &e))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with the given data
    pub fn render(&self, name: &str, data: &Context) -> Result<String> {
        debug!("Rendering snippet template: {}", name);
        self.tera
            .render(name, data)
            .map_err(|e| template_error(name, &e))
    }
}

fn template_error(name: &str, err: &tera::Error) -> TrackingError {
    // Tera keeps the useful part of the message in the source chain.
    let mut message = format!("{name}: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    TrackingError::Template(message)
}
