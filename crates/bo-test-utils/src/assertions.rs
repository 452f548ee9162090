//! Custom test assertions for expressive tests
//!
//! Decodes session tokens without verifying them, to check their shape and
//! claims from the client side.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bo_service::models::Role;
use common::types::UserId;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    pub id: UserId,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub user: SessionUser,
    pub iat: i64,
    pub exp: i64,
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing part {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT part {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT part {} JSON: {}", index, e))
}

/// Custom assertions for session tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_session()
///     .assert_for_user(owner.id)
///     .assert_has_role(Role::SuperAdmin)
///     .assert_lifetime_hours(24);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a three-part HS256 JWT carrying session claims
    fn assert_valid_session(&self) -> &Self;

    /// Assert that the token is for the specified user
    fn assert_for_user(&self, id: UserId) -> &Self;

    /// Assert the role in the token's identity
    fn assert_has_role(&self, role: Role) -> &Self;

    /// Assert `exp - iat`
    fn assert_lifetime_hours(&self, hours: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_session(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header: JwtHeader = decode_part(self, 0);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");

        let _claims: JwtClaims = decode_part(self, 1);
        self
    }

    fn assert_for_user(&self, id: UserId) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        assert_eq!(claims.user.id, id, "Token is for user {}", claims.user.id);
        self
    }

    fn assert_has_role(&self, role: Role) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        assert_eq!(claims.user.role, role);
        self
    }

    fn assert_lifetime_hours(&self, hours: i64) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        assert_eq!(
            claims.exp - claims.iat,
            hours * 3600,
            "Unexpected token lifetime"
        );
        self
    }
}
