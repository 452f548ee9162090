//! Builder patterns for test data construction
//!
//! Provides a fluent API for forging session tokens the server did not issue.

use bo_service::models::{Identity, Role, Team};
use chrono::{DateTime, Duration, Utc};
use common::types::UserId;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for session claims
///
/// # Example
/// ```rust,ignore
/// let token = TestClaimsBuilder::new(now)
///     .for_identity(&member)
///     .expires_in(-60)
///     .sign(TEST_JWT_SECRET);
/// ```
pub struct TestClaimsBuilder {
    user: serde_json::Value,
    iat: i64,
    exp: i64,
}

impl TestClaimsBuilder {
    /// Defaults: an active MEMBER of tenant 1, issued at `now`, valid 24 h.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            user: json!({
                "id": 2,
                "name": "Test Member",
                "email": "test.member@acme.com",
                "role": Role::Member,
                "team": Team::Design,
                "tenant_admin_id": UserId(1),
                "active": true,
            }),
            iat: now.timestamp(),
            exp: (now + Duration::hours(24)).timestamp(),
        }
    }

    /// Use an existing identity as the `user` claim
    pub fn for_identity(mut self, identity: &Identity) -> Self {
        self.user = serde_json::to_value(identity).unwrap_or_default();
        self
    }

    /// Override the role in the `user` claim
    pub fn with_role(mut self, role: Role) -> Self {
        self.user["role"] = json!(role);
        self
    }

    /// Set expiration in seconds relative to `iat` (negative for the past)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = self.iat + seconds;
        self
    }

    /// Set issued-at timestamp, keeping the 24 h lifetime
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        let lifetime = self.exp - self.iat;
        self.iat = timestamp;
        self.exp = timestamp + lifetime;
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> serde_json::Value {
        json!({
            "user": self.user,
            "iat": self.iat,
            "exp": self.exp,
        })
    }

    /// Sign the claims with HS256 and `secret`
    pub fn sign(self, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &self.build(),
            &EncodingKey::from_secret(secret),
        )
        .expect("HS256 signing of test claims should not fail")
    }
}
