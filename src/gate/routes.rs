//! Route exclusion rules.

use std::collections::HashSet;

/// Routes that bypass authentication.
///
/// Built once at middleware construction from the configured route list and
/// immutable thereafter, so concurrent requests read it without
/// synchronization. A route ending in the two-character suffix `/*` is a
/// wildcard and contributes its prefix (trailing slash retained); every other
/// route is an exact match.
#[derive(Clone, Debug, Default)]
pub struct ExcludedRoutes {
    exact: HashSet<String>,
    /// Wildcard prefixes in configured order, duplicates collapsed.
    prefixes: Vec<String>,
}

impl ExcludedRoutes {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut exact = HashSet::new();
        let mut prefixes: Vec<String> = Vec::new();

        for route in routes {
            let route = route.into();
            if let Some(stem) = route.strip_suffix("/*") {
                let prefix = format!("{}/", stem);
                if !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            } else {
                exact.insert(route);
            }
        }

        Self { exact, prefixes }
    }

    /// Whether a request path bypasses authentication.
    ///
    /// Exact matches are checked first (set lookup), then wildcard prefixes in
    /// configured order.
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.exact.contains(path) {
            return true;
        }
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }
}
