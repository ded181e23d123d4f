//! Identity service client contract.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A session record as returned by the identity service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    /// Service-defined lifecycle state, e.g. "active" or "revoked".
    pub status: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A user record as returned by the identity service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An organization record as returned by the identity service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Org {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Trait for identity service clients
///
/// Implement this against your identity provider's API. All failures
/// propagate to the caller unmodified: this crate performs no retry and no
/// suppression, so a lookup failure surfaces as a request-handling failure
/// rather than a stale identity.
///
/// # Example
///
/// ```rust,ignore
/// use tollgate::{IdentityClient, Session, User, Org, Result};
///
/// struct HttpIdentityClient {
///     http: reqwest::Client,
///     base_url: String,
/// }
///
/// #[async_trait]
/// impl IdentityClient for HttpIdentityClient {
///     async fn verify_session(&self, session_id: &str, token: &str) -> Result<Session> {
///         let url = format!("{}/sessions/{}/verify", self.base_url, session_id);
///         let session = self.http.post(url)
///             .bearer_auth(token)
///             .send().await?
///             .error_for_status()?
///             .json().await?;
///         Ok(session)
///     }
///     // find_user / find_org follow the same shape
/// }
/// ```
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Verify a session against the identity service.
    ///
    /// Takes the session id from the token claims and the raw token itself;
    /// returns the live session record or fails.
    async fn verify_session(&self, session_id: &str, token: &str) -> Result<Session>;

    /// Look up a user by id.
    async fn find_user(&self, user_id: &str) -> Result<User>;

    /// Look up an organization by id.
    async fn find_org(&self, org_id: &str) -> Result<Org>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_decodes_service_payload() {
        let json = r#"{
            "id": "sess_1",
            "user_id": "user_1",
            "status": "active",
            "last_active_at": 1717171717
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "sess_1");
        assert_eq!(session.status, "active");
        assert!(session.extra.contains_key("last_active_at"));
    }

    #[test]
    fn test_user_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id":"user_1"}"#).unwrap();
        assert_eq!(user.id, "user_1");
        assert!(user.email.is_none());
    }
}
