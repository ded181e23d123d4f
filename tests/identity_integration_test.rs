//! Integration tests for identity resolution through the gate.
//!
//! These verify that handlers see the identity the resolver established, that
//! lookups are lazy and memoized within a request, and that the cache carries
//! lookups across requests.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tollgate::testing::{self, AuthenticatingResolver, PassThroughResolver, StaticIdentityClient};
use tollgate::{
    AuthGate, AuthResolver, AuthenticatedSession, CurrentIdentity, GateConfig, InMemoryCache,
    Result, SessionClaims,
};

fn gated<R: AuthResolver + 'static>(gate: AuthGate<R>, routes: Router) -> Router {
    routes.layer(axum::middleware::from_fn(move |req, next| {
        let gate = gate.clone();
        async move { gate.handle(req, next).await }
    }))
}

fn client() -> StaticIdentityClient {
    StaticIdentityClient::new()
        .with_session("sess_1", "user_1")
        .with_user("user_1")
        .with_org("org_1")
}

async fn whoami(CurrentIdentity(identity): CurrentIdentity) -> Result<Json<Value>> {
    // Deliberately resolve the user twice: the second call must be free
    let user = identity.user().await?;
    let user_again = identity.user().await?;
    assert_eq!(
        user.as_ref().map(|u| u.id.clone()),
        user_again.as_ref().map(|u| u.id.clone())
    );

    let org = identity.org().await?;

    Ok(Json(json!({
        "authenticated": identity.is_authenticated(),
        "user_id": identity.user_id(),
        "user_email": user.and_then(|u| u.email),
        "org_id": org.map(|o| o.id),
        "org_role": identity.org_role(),
    })))
}

fn whoami_app() -> Router {
    Router::new().route("/whoami", get(whoami))
}

#[tokio::test]
async fn test_handler_sees_resolved_identity() {
    let claims = SessionClaims::new("sess_1", "user_1").with_org("org_1", "admin");
    let resolver = AuthenticatingResolver::new(AuthenticatedSession::new(claims, "tok_raw"));
    let client = client();
    let app = gated(
        AuthGate::new(resolver, Arc::new(client.clone()), GateConfig::default()),
        whoami_app(),
    );

    let body: Value = testing::get(app, "/whoami")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["authenticated"], json!(true));
    assert_eq!(body["user_id"], json!("user_1"));
    assert_eq!(body["user_email"], json!("user_1@example.com"));
    assert_eq!(body["org_id"], json!("org_1"));
    assert_eq!(body["org_role"], json!("admin"));

    // Two user() calls in the handler, one lookup on the wire
    assert_eq!(client.user_lookups(), 1);
    assert_eq!(client.org_lookups(), 1);
    // session() was never called, so no verification happened
    assert_eq!(client.session_verifications(), 0);
}

#[tokio::test]
async fn test_unauthenticated_request_sees_empty_identity() {
    let client = client();
    let app = gated(
        AuthGate::new(
            PassThroughResolver,
            Arc::new(client.clone()),
            GateConfig::default(),
        ),
        whoami_app(),
    );

    let body: Value = testing::get(app, "/whoami")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["authenticated"], json!(false));
    assert_eq!(body["user_id"], json!(null));
    assert_eq!(body["org_id"], json!(null));
    assert_eq!(body["org_role"], json!(null));

    // Null claims never touch the identity service
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn test_org_absent_when_claims_carry_no_org() {
    let claims = SessionClaims::new("sess_1", "user_1");
    let resolver = AuthenticatingResolver::new(AuthenticatedSession::new(claims, "tok_raw"));
    let client = client();
    let app = gated(
        AuthGate::new(resolver, Arc::new(client.clone()), GateConfig::default()),
        whoami_app(),
    );

    let body: Value = testing::get(app, "/whoami")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["user_id"], json!("user_1"));
    assert_eq!(body["org_id"], json!(null));
    assert_eq!(client.org_lookups(), 0);
}

#[tokio::test]
async fn test_cache_carries_user_lookup_across_requests() {
    let claims = SessionClaims::new("sess_1", "user_1");
    let resolver = AuthenticatingResolver::new(AuthenticatedSession::new(claims, "tok_raw"));
    let client = client();
    let cache = Arc::new(InMemoryCache::new(100));
    let app = gated(
        AuthGate::new(resolver, Arc::new(client.clone()), GateConfig::default())
            .with_cache(cache),
        whoami_app(),
    );

    for _ in 0..3 {
        testing::get(app.clone(), "/whoami")
            .execute()
            .await
            .assert_ok();
    }

    // Three requests, three identity proxies, one lookup within the TTL window
    assert_eq!(client.user_lookups(), 1);
    assert_eq!(client.org_lookups(), 0);
}

#[tokio::test]
async fn test_lookup_failure_surfaces_as_request_failure() {
    // The session names a user the identity service doesn't know
    let claims = SessionClaims::new("sess_1", "user_ghost");
    let resolver = AuthenticatingResolver::new(AuthenticatedSession::new(claims, "tok_raw"));
    let app = gated(
        AuthGate::new(
            resolver,
            Arc::new(StaticIdentityClient::new()),
            GateConfig::default(),
        ),
        whoami_app(),
    );

    // The handler propagates the NotFound lookup failure; no stale identity
    // is substituted
    testing::get(app, "/whoami")
        .execute()
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}
