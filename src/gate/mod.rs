//! The request lifecycle middleware.
//!
//! [`AuthGate`] owns the per-request pipeline: route exclusion, delegation to
//! the [`AuthResolver`], identity injection, and merging the resolver's
//! response headers and cookies into the application's response.

mod config;
mod cookie;
mod layer;
mod resolver;
mod routes;

pub use config::{GateConfig, GateConfigBuilder};
pub use cookie::CookieSetterParams;
pub use layer::AuthGate;
pub use resolver::{AuthResolver, ResolverOutcome};
pub use routes::ExcludedRoutes;
