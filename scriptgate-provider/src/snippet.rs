//! Page snippets produced by enabled providers.

use crate::traits::Provider;
use scriptgate_common::{Result, SNIPPET_PRIORITY};
use std::sync::Arc;

/// Where in the document a snippet is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Before `</head>`
    EndOfHead,
    /// Before `</body>`
    EndOfBody,
}

/// Which pages a snippet applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Public-facing pages
    Frontend,
    /// Administrative pages
    Backend,
}

/// A provider's HTML fragment plus placement metadata.
///
/// Rendering goes through the provider on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct Snippet {
    provider: Arc<dyn Provider>,
    location: Location,
    priority: i32,
    zone: Zone,
}

impl Snippet {
    /// Snippet placed at the end of the body of frontend pages
    pub fn for_provider(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            location: Location::EndOfBody,
            priority: SNIPPET_PRIORITY,
            zone: Zone::Frontend,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn applies_to(&self, zone: Zone) -> bool {
        self.zone == zone
    }

    /// Render the provider's snippet
    pub fn render(&self) -> Result<String> {
        self.provider.fetch_snippet()
    }
}
