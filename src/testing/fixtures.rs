//! In-memory collaborator fixtures.

use crate::error::{Result, TollgateError};
use crate::gate::{AuthResolver, ResolverOutcome};
use crate::identity::{AuthenticatedSession, IdentityClient, Org, Session, User};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Helper functions for generating fake test data
pub mod fake {
    use uuid::Uuid;

    /// Generate a fake user id
    pub fn user_id() -> String {
        format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    /// Generate a fake organization id
    pub fn org_id() -> String {
        format!("org_{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    /// Generate a fake session id
    pub fn session_id() -> String {
        format!("sess_{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    /// Generate a fake email address
    pub fn email() -> String {
        format!("test-{}@example.com", Uuid::new_v4().simple())
    }

    /// Generate a fake opaque token
    pub fn token() -> String {
        format!("tok_{:016x}", fastrand::u64(..))
    }
}

#[derive(Default)]
struct StaticIdentityState {
    sessions: RwLock<HashMap<String, Session>>,
    users: RwLock<HashMap<String, User>>,
    orgs: RwLock<HashMap<String, Org>>,
    session_verifications: AtomicUsize,
    user_lookups: AtomicUsize,
    org_lookups: AtomicUsize,
}

/// In-memory [`IdentityClient`] with call counters.
///
/// Unknown ids fail the way a real identity service would, and every call is
/// counted so tests can assert memoization and caching behavior.
#[derive(Clone, Default)]
pub struct StaticIdentityClient {
    state: Arc<StaticIdentityState>,
}

impl StaticIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a verifiable session.
    pub fn with_session(self, session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        let session = Session {
            id: session_id.clone(),
            user_id: user_id.into(),
            status: "active".to_string(),
            extra: serde_json::Map::new(),
        };
        self.state
            .sessions
            .write()
            .unwrap()
            .insert(session_id, session);
        self
    }

    /// Register a resolvable user.
    pub fn with_user(self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let user = User {
            id: user_id.clone(),
            email: Some(format!("{}@example.com", user_id)),
            name: None,
            extra: serde_json::Map::new(),
        };
        self.state.users.write().unwrap().insert(user_id, user);
        self
    }

    /// Register a resolvable organization.
    pub fn with_org(self, org_id: impl Into<String>) -> Self {
        let org_id = org_id.into();
        let org = Org {
            id: org_id.clone(),
            name: Some(format!("{} Inc.", org_id)),
            extra: serde_json::Map::new(),
        };
        self.state.orgs.write().unwrap().insert(org_id, org);
        self
    }

    pub fn session_verifications(&self) -> usize {
        self.state.session_verifications.load(Ordering::SeqCst)
    }

    pub fn user_lookups(&self) -> usize {
        self.state.user_lookups.load(Ordering::SeqCst)
    }

    pub fn org_lookups(&self) -> usize {
        self.state.org_lookups.load(Ordering::SeqCst)
    }

    /// Total calls of any kind this client has served.
    pub fn total_calls(&self) -> usize {
        self.session_verifications() + self.user_lookups() + self.org_lookups()
    }
}

#[async_trait]
impl IdentityClient for StaticIdentityClient {
    async fn verify_session(&self, session_id: &str, token: &str) -> Result<Session> {
        self.state
            .session_verifications
            .fetch_add(1, Ordering::SeqCst);

        if token.is_empty() {
            return Err(TollgateError::unauthorized("Empty session token"));
        }

        self.state
            .sessions
            .read()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| TollgateError::unauthorized(format!("Unknown session: {}", session_id)))
    }

    async fn find_user(&self, user_id: &str) -> Result<User> {
        self.state.user_lookups.fetch_add(1, Ordering::SeqCst);

        self.state
            .users
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| TollgateError::not_found(format!("User: {}", user_id)))
    }

    async fn find_org(&self, org_id: &str) -> Result<Org> {
        self.state.org_lookups.fetch_add(1, Ordering::SeqCst);

        self.state
            .orgs
            .read()
            .unwrap()
            .get(org_id)
            .cloned()
            .ok_or_else(|| TollgateError::not_found(format!("Organization: {}", org_id)))
    }
}

/// Resolver that lets every request through unauthenticated.
#[derive(Clone, Default)]
pub struct PassThroughResolver;

#[async_trait]
impl AuthResolver for PassThroughResolver {
    async fn resolve(&self, _request: &mut Request) -> Result<ResolverOutcome> {
        Ok(ResolverOutcome::pass())
    }
}

/// Resolver that authenticates every request with a fixed session and
/// optionally asks for response headers to be merged.
#[derive(Clone)]
pub struct AuthenticatingResolver {
    session: AuthenticatedSession,
    headers: HeaderMap,
}

impl AuthenticatingResolver {
    pub fn new(session: AuthenticatedSession) -> Self {
        Self {
            session,
            headers: HeaderMap::new(),
        }
    }

    /// Add a response header to merge (repeatable; repeated names append).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(
            HeaderName::try_from(name).expect("valid header name"),
            HeaderValue::try_from(value).expect("valid header value"),
        );
        self
    }

    /// Add a `Set-Cookie` directive to merge.
    pub fn with_cookie(self, directive: &str) -> Self {
        self.with_header("set-cookie", directive)
    }
}

#[async_trait]
impl AuthResolver for AuthenticatingResolver {
    async fn resolve(&self, request: &mut Request) -> Result<ResolverOutcome> {
        request.extensions_mut().insert(self.session.clone());
        Ok(ResolverOutcome::Continue(self.headers.clone()))
    }
}

/// Resolver that terminates every request with a fixed response.
#[derive(Clone)]
pub struct ShortCircuitResolver {
    status: StatusCode,
    body: String,
    headers: HeaderMap,
}

impl ShortCircuitResolver {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(
            HeaderName::try_from(name).expect("valid header name"),
            HeaderValue::try_from(value).expect("valid header value"),
        );
        self
    }
}

#[async_trait]
impl AuthResolver for ShortCircuitResolver {
    async fn resolve(&self, _request: &mut Request) -> Result<ResolverOutcome> {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers.clone());
        Ok(ResolverOutcome::ShortCircuit(response))
    }
}
