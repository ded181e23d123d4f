//! Lazy identity resolution.
//!
//! The [`Identity`] proxy gives handlers a uniform view of the authenticated
//! session, user, and organization without forcing eager network calls: each
//! derived value is resolved on first access, memoized for the life of the
//! request, and (for user/org lookups) shared across requests through the
//! configured cache.

mod claims;
mod client;
mod extractors;
mod proxy;

pub use claims::{AuthenticatedSession, SessionClaims};
pub use client::{IdentityClient, Org, Session, User};
pub use extractors::CurrentIdentity;
pub use proxy::Identity;
