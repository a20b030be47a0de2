use crate::traits::Provider;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// A GET route serving one provider's proxied script
#[derive(Debug, Clone)]
pub struct ScriptRoute {
    pub path: String,
    pub name: String,
    pub provider: Arc<dyn Provider>,
}

/// Named GET routes registered by providers.
///
/// The HTTP layer turns the table into a router; the names let callers look
/// paths up again without re-deriving them.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ScriptRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Bind `provider` to GET `path` under `name`. A second binding with the
    /// same name replaces the first.
    pub fn get(
        &mut self,
        path: impl Into<String>,
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) {
        let route = ScriptRoute {
            path: path.into(),
            name: name.into(),
            provider,
        };
        debug!("Registering route {} -> {}", route.name, route.path);

        if let Some(existing) = self.routes.iter_mut().find(|r| r.name == route.name) {
            warn!("Route {} registered twice, replacing", route.name);
            *existing = route;
        } else {
            self.routes.push(route);
        }
    }

    pub fn routes(&self) -> &[ScriptRoute] {
        &self.routes
    }

    pub fn find(&self, name: &str) -> Option<&ScriptRoute> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Path registered under `name`
    pub fn path_for(&self, name: &str) -> Option<&str> {
        self.find(name).map(|r| r.path.as_str())
    }

    /// Absolute URL of the route registered under `name`, below `base`
    pub fn url_for(&self, name: &str, base: &Url) -> Option<String> {
        let path = self.path_for(name)?;
        Some(format!("{}{path}", base.as_str().trim_end_matches('/')))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a ScriptRoute;
    type IntoIter = std::slice::Iter<'a, ScriptRoute>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
