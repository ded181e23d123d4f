//! The request-scoped identity proxy.

use crate::error::Result;
use crate::identity::claims::{AuthenticatedSession, SessionClaims};
use crate::identity::client::{IdentityClient, Org, Session, User};
use crate::traits::cache::{Cache, CacheExt};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// TTL for user/org lookups routed through the configured cache.
const LOOKUP_TTL: Duration = Duration::from_secs(60);

struct IdentityInner {
    auth: Option<AuthenticatedSession>,
    client: Arc<dyn IdentityClient>,
    cache: Option<Arc<dyn Cache>>,
    // Memoized lookups. Each cell is tri-state: unset (not yet computed),
    // set(None) (computed, unauthenticated/absent), set(Some) (computed).
    // A failed computation leaves the cell unset.
    session: OnceCell<Option<Session>>,
    user: OnceCell<Option<User>>,
    org: OnceCell<Option<Org>>,
}

/// Lazily-evaluated view of the authenticated identity.
///
/// One `Identity` is built per request by [`AuthGate`] and inserted into the
/// request's extensions. Every accessor degrades to `None` on an
/// unauthenticated request without contacting the identity service; on an
/// authenticated request, `session`/`user`/`org` each cost at most one
/// network call for the life of the instance, with user/org lookups
/// additionally shared across requests through the cache for 60 seconds.
///
/// Cloning is cheap and clones share memoization state.
///
/// [`AuthGate`]: crate::gate::AuthGate
#[derive(Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

impl Identity {
    /// Build an identity from a resolver-authenticated session, or a
    /// "no identity" placeholder when `auth` is `None`.
    pub fn new(
        auth: Option<AuthenticatedSession>,
        client: Arc<dyn IdentityClient>,
        cache: Option<Arc<dyn Cache>>,
    ) -> Self {
        Self {
            inner: Arc::new(IdentityInner {
                auth,
                client,
                cache,
                session: OnceCell::new(),
                user: OnceCell::new(),
                org: OnceCell::new(),
            }),
        }
    }

    /// Whether the request carried a verified session token.
    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.is_some()
    }

    /// The raw session claims, if the request was authenticated.
    pub fn claims(&self) -> Option<&SessionClaims> {
        self.inner.auth.as_ref().map(|auth| &auth.claims)
    }

    /// The authenticated user's id (`sub` claim).
    pub fn user_id(&self) -> Option<&str> {
        self.claims()?.sub.as_deref()
    }

    /// The active organization id.
    ///
    /// An org id is only honored in the presence of a user id: without `sub`,
    /// this is `None` even when the token carries `org_id`.
    pub fn org_id(&self) -> Option<&str> {
        self.user_id()?;
        self.claims()?.org_id.as_deref()
    }

    /// The user's role in the active organization (`org_role` claim).
    pub fn org_role(&self) -> Option<&str> {
        self.claims()?.org_role.as_deref()
    }

    /// The user's permissions in the active organization.
    pub fn org_permissions(&self) -> Option<&[String]> {
        self.claims()?.org_permissions.as_deref()
    }

    /// The verified session, or `None` on an unauthenticated request.
    ///
    /// The first call verifies the session against the identity service using
    /// the `sid` claim and the paired token; later calls return the memoized
    /// result without re-verifying. Verification failures propagate and are
    /// not memoized.
    pub async fn session(&self) -> Result<Option<Session>> {
        let session = self
            .inner
            .session
            .get_or_try_init(|| async move {
                let Some(auth) = &self.inner.auth else {
                    return Ok(None);
                };
                let Some(sid) = auth.claims.sid.as_deref() else {
                    // Claims without a session id cannot be verified; treat as
                    // unauthenticated rather than failing.
                    return Ok(None);
                };
                self.inner
                    .client
                    .verify_session(sid, &auth.token)
                    .await
                    .map(Some)
            })
            .await?;
        Ok(session.clone())
    }

    /// The authenticated user, or `None` when no user id is present.
    ///
    /// Looked up at most once per instance and cached across requests under
    /// `user:{id}` for 60 seconds.
    pub async fn user(&self) -> Result<Option<User>> {
        let user = self
            .inner
            .user
            .get_or_try_init(|| async move {
                let Some(id) = self.user_id() else {
                    return Ok(None);
                };
                let key = format!("user:{}", id);
                let id = id.to_string();
                self.cached_fetch(&key, || async move {
                    self.inner.client.find_user(&id).await
                })
                .await
                .map(Some)
            })
            .await?;
        Ok(user.clone())
    }

    /// The active organization, or `None` when [`org_id`](Self::org_id) is
    /// `None`.
    ///
    /// Looked up at most once per instance and cached across requests under
    /// `org:{id}` for 60 seconds.
    pub async fn org(&self) -> Result<Option<Org>> {
        let org = self
            .inner
            .org
            .get_or_try_init(|| async move {
                let Some(id) = self.org_id() else {
                    return Ok(None);
                };
                let key = format!("org:{}", id);
                let id = id.to_string();
                self.cached_fetch(&key, || async move {
                    self.inner.client.find_org(&id).await
                })
                .await
                .map(Some)
            })
            .await?;
        Ok(org.clone())
    }

    /// Fetch through the configured cache, or compute directly when no cache
    /// is configured. Keys are namespaced by entity kind (`user:`/`org:`) so
    /// user and org caches cannot collide.
    async fn cached_fetch<T, F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        match &self.inner.cache {
            Some(cache) => cache.fetch(key, LOOKUP_TTL, compute).await,
            None => compute().await,
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("authenticated", &self.is_authenticated())
            .field("user_id", &self.user_id())
            .field("org_id", &self.org_id())
            .finish()
    }
}
