//! The gate middleware itself.

use crate::error::{Result, TollgateError};
use crate::gate::config::GateConfig;
use crate::gate::cookie::CookieSetterParams;
use crate::gate::resolver::{AuthResolver, ResolverOutcome};
use crate::gate::routes::ExcludedRoutes;
use crate::identity::{AuthenticatedSession, Identity, IdentityClient};
use crate::traits::cache::Cache;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, header};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashSet;
use std::sync::Arc;

/// Middleware that authenticates requests against an external identity
/// service.
///
/// Per request: excluded paths pass straight through; otherwise the
/// [`AuthResolver`] runs and either short-circuits with its own response or
/// lets the request proceed, after which the resolver's response headers are
/// merged into the application's response. On the proceed path an
/// [`Identity`] is inserted into the request extensions for handlers (see
/// [`CurrentIdentity`](crate::identity::CurrentIdentity)).
///
/// # Example
///
/// ```rust,ignore
/// use tollgate::{AuthGate, GateConfig};
///
/// let gate = AuthGate::new(resolver, Arc::new(client), GateConfig::from_env())
///     .with_cache(Arc::new(InMemoryCache::new(10_000)));
///
/// let app = Router::new()
///     .route("/dashboard", get(dashboard))
///     .layer(axum::middleware::from_fn(move |req, next| {
///         let gate = gate.clone();
///         async move { gate.handle(req, next).await }
///     }));
/// ```
pub struct AuthGate<R> {
    resolver: Arc<R>,
    client: Arc<dyn IdentityClient>,
    cache: Option<Arc<dyn Cache>>,
    routes: ExcludedRoutes,
}

impl<R> Clone for AuthGate<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            client: self.client.clone(),
            cache: self.cache.clone(),
            routes: self.routes.clone(),
        }
    }
}

impl<R: AuthResolver> AuthGate<R> {
    pub fn new(resolver: R, client: Arc<dyn IdentityClient>, config: GateConfig) -> Self {
        Self {
            resolver: Arc::new(resolver),
            client,
            cache: None,
            routes: ExcludedRoutes::new(config.excluded_routes),
        }
    }

    /// Route user/org lookups through a cache (60-second TTL).
    ///
    /// Without a cache every lookup hits the identity service.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The exclusion rules this gate was built with.
    pub fn excluded_routes(&self) -> &ExcludedRoutes {
        &self.routes
    }

    /// Middleware entry point; wire with `axum::middleware::from_fn`.
    pub async fn handle(&self, mut request: Request, next: Next) -> Result<Response> {
        if self.routes.is_excluded(request.uri().path()) {
            tracing::trace!(path = %request.uri().path(), "route excluded from authentication");
            return Ok(next.run(request).await);
        }

        let headers = match self.resolver.resolve(&mut request).await? {
            ResolverOutcome::ShortCircuit(response) => {
                tracing::debug!(
                    status = response.status().as_u16(),
                    path = %request.uri().path(),
                    "resolver short-circuited request"
                );
                return Ok(response);
            }
            ResolverOutcome::Continue(headers) => headers,
        };

        // The resolver deposits the authenticated session (if any) in the
        // request extensions; drain it into the request's identity proxy.
        let auth = request.extensions_mut().remove::<AuthenticatedSession>();
        let identity = Identity::new(auth, self.client.clone(), self.cache.clone());
        request.extensions_mut().insert(identity);

        let mut response = next.run(request).await;
        merge_resolver_headers(&mut response, headers)?;
        Ok(response)
    }
}

/// Merge resolver-produced headers into the application's response.
///
/// `Set-Cookie` entries are parsed and appended additively so the
/// application's own cookies survive. Every other header is merged by key
/// with the resolver winning on conflict; a multi-valued resolver header
/// replaces the application's values for that key wholesale.
fn merge_resolver_headers(response: &mut Response, headers: HeaderMap) -> Result<()> {
    if headers.is_empty() {
        return Ok(());
    }

    let mut cookies = Vec::new();
    let mut replaced: HashSet<HeaderName> = HashSet::new();

    for (name, value) in headers.iter() {
        if *name == header::SET_COOKIE {
            let raw = value.to_str().map_err(|e| {
                TollgateError::malformed_cookie(format!("non-UTF-8 Set-Cookie value: {}", e))
            })?;
            cookies.push(CookieSetterParams::parse(raw)?);
        } else if replaced.insert(name.clone()) {
            response.headers_mut().insert(name.clone(), value.clone());
        } else {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }

    for cookie in &cookies {
        response
            .headers_mut()
            .append(header::SET_COOKIE, cookie.to_header_value()?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn app_response() -> Response {
        let mut response = Response::new(axum::body::Body::empty());
        response
            .headers_mut()
            .insert("x-app", HeaderValue::from_static("app"));
        response
            .headers_mut()
            .insert(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        response
    }

    #[test]
    fn test_merge_preserves_application_cookies() {
        let mut response = app_response();

        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("b=2; Expires=Wed, 09 Jun 2021 10:18:14 GMT"),
        );

        merge_resolver_headers(&mut response, headers).unwrap();

        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("a=1"));
        assert!(cookies[1].starts_with("b=2"));
        assert!(cookies[1].contains("Expires="));
    }

    #[test]
    fn test_merge_resolver_wins_on_header_conflict() {
        let mut response = app_response();

        let mut headers = HeaderMap::new();
        headers.insert("x-app", HeaderValue::from_static("resolver"));
        headers.insert("x-resolver", HeaderValue::from_static("only"));

        merge_resolver_headers(&mut response, headers).unwrap();

        assert_eq!(response.headers().get("x-app").unwrap(), "resolver");
        assert_eq!(response.headers().get("x-resolver").unwrap(), "only");
    }

    #[test]
    fn test_merge_multi_valued_resolver_header_replaces_wholesale() {
        let mut response = app_response();

        let mut headers = HeaderMap::new();
        headers.append("x-app", HeaderValue::from_static("first"));
        headers.append("x-app", HeaderValue::from_static("second"));

        merge_resolver_headers(&mut response, headers).unwrap();

        let values: Vec<_> = response
            .headers()
            .get_all("x-app")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[test]
    fn test_merge_empty_headers_leaves_response_untouched() {
        let mut response = app_response();
        merge_resolver_headers(&mut response, HeaderMap::new()).unwrap();

        assert_eq!(response.headers().get("x-app").unwrap(), "app");
        assert_eq!(
            response.headers().get_all(header::SET_COOKIE).iter().count(),
            1
        );
    }

    #[test]
    fn test_merge_rejects_malformed_resolver_cookie() {
        let mut response = app_response();

        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("not-a-cookie"));

        let err = merge_resolver_headers(&mut response, headers).unwrap_err();
        assert!(matches!(err, TollgateError::MalformedCookie(_)));
    }
}
