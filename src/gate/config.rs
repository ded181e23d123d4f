use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// Gate configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GateConfig {
    /// Routes that bypass authentication.
    ///
    /// Each entry is either an exact path (`/health`) or a wildcard path
    /// ending in `/*` (`/static/*`).
    #[serde(default)]
    pub excluded_routes: Vec<String>,
}

impl GateConfig {
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::new()
    }

    /// Load gate configuration from environment variables
    ///
    /// `TOLLGATE_EXCLUDED_ROUTES` is a comma-separated route list, e.g.
    /// `"/health,/static/*"`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(routes) = get_env_with_prefix("EXCLUDED_ROUTES") {
            config.excluded_routes = routes
                .split(',')
                .map(str::trim)
                .filter(|route| !route.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }
}

/// Builder for GateConfig
#[must_use = "builder does nothing until you call build()"]
pub struct GateConfigBuilder {
    config: GateConfig,
}

impl GateConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GateConfig::default(),
        }
    }

    /// Add a single excluded route
    pub fn with_excluded_route(mut self, route: impl Into<String>) -> Self {
        self.config.excluded_routes.push(route.into());
        self
    }

    /// Add multiple excluded routes
    pub fn with_excluded_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .excluded_routes
            .extend(routes.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> GateConfig {
        self.config
    }
}

impl Default for GateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = GateConfig::builder()
            .with_excluded_route("/health")
            .with_excluded_routes(["/static/*", "/favicon.ico"])
            .build();

        assert_eq!(
            config.excluded_routes,
            vec!["/health", "/static/*", "/favicon.ico"]
        );
    }

    #[test]
    fn test_from_env() {
        unsafe {
            std::env::set_var("TOLLGATE_EXCLUDED_ROUTES", "/health, /static/*");
        }
        let config = GateConfig::from_env();
        assert_eq!(config.excluded_routes, vec!["/health", "/static/*"]);
        unsafe {
            std::env::remove_var("TOLLGATE_EXCLUDED_ROUTES");
        }
    }
}
