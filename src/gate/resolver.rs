//! Authentication resolver contract.

use crate::error::Result;
use async_trait::async_trait;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;

/// What the resolver decided about a request.
#[derive(Debug)]
pub enum ResolverOutcome {
    /// Terminal response (redirect, 401, handshake page). The wrapped
    /// application is never invoked; this response is returned verbatim.
    ShortCircuit(Response),

    /// Proceed to the wrapped application, merging these headers into its
    /// response afterwards. The map may be empty and may carry multiple
    /// `Set-Cookie` entries.
    Continue(HeaderMap),
}

impl ResolverOutcome {
    /// Continue with no headers to merge.
    pub fn pass() -> Self {
        Self::Continue(HeaderMap::new())
    }
}

/// Trait for authentication resolvers
///
/// A resolver owns the decision of whether a request is authenticated: token
/// extraction, verification, and any cross-domain handshake live behind this
/// interface. The middleware calls it once per non-excluded request.
///
/// A resolver that authenticates the request must deposit an
/// [`AuthenticatedSession`] into the request's extensions; the middleware
/// builds the request's [`Identity`] from it. Leaving the extensions
/// untouched yields a "no identity" placeholder downstream.
///
/// # Example
///
/// ```rust,ignore
/// use tollgate::{AuthResolver, AuthenticatedSession, ResolverOutcome, Result, SessionClaims};
///
/// #[async_trait]
/// impl AuthResolver for HeaderResolver {
///     async fn resolve(&self, request: &mut Request) -> Result<ResolverOutcome> {
///         let Some(token) = bearer_token(request) else {
///             // Unauthenticated but allowed through; handlers see no identity
///             return Ok(ResolverOutcome::pass());
///         };
///         let claims: SessionClaims = self.verifier.decode(&token)?;
///         request
///             .extensions_mut()
///             .insert(AuthenticatedSession::new(claims, token));
///         Ok(ResolverOutcome::pass())
///     }
/// }
/// ```
///
/// [`AuthenticatedSession`]: crate::identity::AuthenticatedSession
/// [`Identity`]: crate::identity::Identity
#[async_trait]
pub trait AuthResolver: Send + Sync {
    /// Resolve authentication for a request.
    async fn resolve(&self, request: &mut Request) -> Result<ResolverOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_is_empty_continue() {
        match ResolverOutcome::pass() {
            ResolverOutcome::Continue(headers) => assert!(headers.is_empty()),
            ResolverOutcome::ShortCircuit(_) => panic!("expected Continue"),
        }
    }
}
