//! Testing utilities for applications using Tollgate
//!
//! This module provides:
//! - In-memory identity service and resolver fixtures with call counters
//! - An in-process HTTP scenario harness for exercising gated routers
//!   without running a server
//!
//! # Example
//!
//! ```rust,ignore
//! use tollgate::testing::{self, StaticIdentityClient, PassThroughResolver};
//!
//! #[tokio::test]
//! async fn test_health_bypasses_auth() {
//!     let app = gated_router(PassThroughResolver);
//!
//!     testing::get(app, "/health")
//!         .execute()
//!         .await
//!         .assert_ok();
//! }
//! ```

mod fixtures;
mod scenario;

pub use fixtures::{
    AuthenticatingResolver, PassThroughResolver, ShortCircuitResolver, StaticIdentityClient, fake,
};
pub use scenario::{Scenario, ScenarioAssert, get, post};
