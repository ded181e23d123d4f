//! Session token claims.

use serde::{Deserialize, Serialize};

/// Claims decoded from a session token.
///
/// Only the fields this crate derives identity from are typed; everything
/// else the identity service puts in the token lands in `extra`. Immutable
/// once constructed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id, required to re-verify the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Subject: the authenticated user's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Active organization id, if the session carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// The user's role in the active organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_role: Option<String>,

    /// The user's permissions in the active organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_permissions: Option<Vec<String>>,

    /// Claims this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionClaims {
    /// Create claims for a bare authenticated session.
    pub fn new(sid: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            sid: Some(sid.into()),
            sub: Some(sub.into()),
            ..Self::default()
        }
    }

    /// Attach an active organization to these claims.
    pub fn with_org(mut self, org_id: impl Into<String>, org_role: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self.org_role = Some(org_role.into());
        self
    }

    /// Attach organization permissions to these claims.
    pub fn with_org_permissions(mut self, permissions: Vec<String>) -> Self {
        self.org_permissions = Some(permissions);
        self
    }
}

/// A verified session: claims paired with the raw token they were decoded
/// from.
///
/// Resolvers deposit one of these into the request's extensions when they
/// authenticate a request; the middleware drains it to build the request's
/// [`Identity`](crate::identity::Identity). The token is kept because
/// re-verifying the session against the identity service requires it.
#[derive(Clone, Debug)]
pub struct AuthenticatedSession {
    pub claims: SessionClaims,
    pub token: String,
}

impl AuthenticatedSession {
    pub fn new(claims: SessionClaims, token: impl Into<String>) -> Self {
        Self {
            claims,
            token: token.into(),
        }
    }
}
