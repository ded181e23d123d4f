//! Tollgate - identity-aware authentication middleware for Axum
//!
//! Tollgate sits between your router and an external identity/session service,
//! deciding which requests require authentication, exposing the resolved
//! identity lazily to your handlers, and reconciling the auth service's
//! response headers and cookies with your application's own response.
//!
//! # Features
//!
//! - **Request gating**: exact and wildcard route exclusions, resolver
//!   short-circuits (redirects, 401s) that skip your handlers entirely
//! - **Lazy identity**: session, user, and organization data resolved on first
//!   access, memoized per request, with a pluggable 60-second lookup cache
//! - **Safe cookie merging**: resolver `Set-Cookie` directives are parsed and
//!   appended without clobbering cookies your application sets
//! - **Pluggable collaborators**: bring your own `IdentityClient`,
//!   `AuthResolver`, and `Cache` implementations
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use axum::{routing::get, Router};
//! use std::sync::Arc;
//! use tollgate::{AuthGate, GateConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     tollgate::init_tracing();
//!
//!     let config = GateConfig::builder()
//!         .with_excluded_route("/health")
//!         .with_excluded_route("/static/*")
//!         .build();
//!
//!     let gate = AuthGate::new(my_resolver, Arc::new(my_client), config);
//!
//!     let app: Router = Router::new()
//!         .route("/dashboard", get(dashboard))
//!         .layer(axum::middleware::from_fn(move |req, next| {
//!             let gate = gate.clone();
//!             async move { gate.handle(req, next).await }
//!         }));
//! }
//! ```

#![allow(async_fn_in_trait)] // async_trait macro handles Send/Sync bounds properly

pub mod cache;
mod error;
pub mod gate;
pub mod identity;
pub mod testing;
pub mod traits;
mod utils;

// Re-exports for public API
pub use cache::{CacheConfig, InMemoryCache, NoOpCache};
pub use error::{Result, TollgateError};
pub use gate::{
    AuthGate, AuthResolver, CookieSetterParams, ExcludedRoutes, GateConfig, GateConfigBuilder,
    ResolverOutcome,
};
pub use identity::{
    AuthenticatedSession, CurrentIdentity, Identity, IdentityClient, Org, Session, SessionClaims,
    User,
};
pub use traits::cache::{Cache, CacheExt};

// Re-exported because CookieSetterParams exposes its types (SameSite,
// time::OffsetDateTime, time::Duration) in the public API
pub use cookie;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "tollgate=debug")
/// - `TOLLGATE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("TOLLGATE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
