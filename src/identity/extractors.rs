//! Axum extractors for the request identity.

use crate::error::TollgateError;
use crate::identity::proxy::Identity;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::future::Future;

/// Extract the request's [`Identity`] from extensions.
///
/// Requires the [`AuthGate`](crate::gate::AuthGate) middleware to be applied;
/// excluded routes never carry an identity.
///
/// # Example
///
/// ```rust,ignore
/// use tollgate::CurrentIdentity;
///
/// async fn profile(CurrentIdentity(identity): CurrentIdentity) -> Result<Json<Profile>> {
///     let user = identity.user().await?;
///     // ...
/// }
/// ```
pub struct CurrentIdentity(pub Identity);

impl CurrentIdentity {
    /// Consume the extractor and return the identity.
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = TollgateError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();
        async move {
            identity.map(CurrentIdentity).ok_or_else(|| {
                TollgateError::internal(
                    "Identity not found in request extensions; is the AuthGate middleware applied?",
                )
            })
        }
    }
}
