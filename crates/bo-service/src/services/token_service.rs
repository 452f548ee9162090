//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the caller's identity projection. Expiry and
//! issued-at are checked against the injected [`Clock`] rather than the
//! library's wall-clock validation, so tests can move time deterministically.

use crate::clock::Clock;
use crate::config::{Config, ConfigError};
use crate::errors::BoError;
use crate::models::Identity;
use crate::observability::metrics::{record_token_issuance, record_token_validation};
use chrono::Duration;
use common::jwt::{check_token_size, validate_iat_at};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Fixed session lifetime.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

pub(crate) const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Claims carried by a session token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: Identity,
    pub iat: i64,
    pub exp: i64,
}

/// Identity fields are summarised; e-mail never appears.
impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("user_id", &self.user.id)
            .field("role", &self.user.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

pub struct TokenService {
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
    clock: Arc<dyn Clock>,
    clock_skew: std::time::Duration,
}

impl TokenService {
    /// Build from raw secret bytes. An empty secret leaves the service
    /// without keys: issuance fails with `BoError::Signing` and every token
    /// is rejected.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>, clock_skew: std::time::Duration) -> Self {
        let (encoding_key, decoding_key) = if secret.is_empty() {
            (None, None)
        } else {
            (
                Some(EncodingKey::from_secret(secret)),
                Some(DecodingKey::from_secret(secret)),
            )
        };

        Self {
            encoding_key,
            decoding_key,
            clock,
            clock_skew,
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let secret = config.jwt_secret_bytes()?;
        let skew_secs = u64::try_from(config.jwt_clock_skew_seconds).map_err(|_| {
            ConfigError::InvalidJwtClockSkew(format!(
                "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                config.jwt_clock_skew_seconds
            ))
        })?;

        Ok(Self::new(
            &secret,
            clock,
            std::time::Duration::from_secs(skew_secs),
        ))
    }

    /// Sign a session token for `identity`, valid for 24 hours from now.
    #[instrument(skip_all, fields(user_id = %identity.id))]
    pub fn issue(&self, identity: &Identity) -> Result<String, BoError> {
        let start = Instant::now();

        let Some(key) = self.encoding_key.as_ref() else {
            tracing::error!(target: "bo.services.token", "Session signing secret is not configured");
            record_token_issuance("error", start.elapsed());
            return Err(BoError::Signing(
                "Session signing secret is not configured".to_string(),
            ));
        };

        let now = self.clock.now();
        let claims = SessionClaims {
            user: identity.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, key).map_err(|e| {
            record_token_issuance("error", start.elapsed());
            BoError::Signing(format!("JWT signing operation failed: {}", e))
        })?;

        record_token_issuance("success", start.elapsed());
        Ok(token)
    }

    /// Verify signature, expiry and issued-at of a session token.
    ///
    /// Every failure is reported as the same `BoError::InvalidToken` so the
    /// response does not reveal which check failed.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<SessionClaims, BoError> {
        let invalid = || BoError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string());

        if let Err(e) = check_token_size(token) {
            tracing::debug!(target: "bo.services.token", error = %e, token_size = token.len(), "Token rejected before parsing");
            record_token_validation("error", Some("size"));
            return Err(invalid());
        }

        let Some(key) = self.decoding_key.as_ref() else {
            record_token_validation("error", Some("no_key"));
            return Err(invalid());
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let claims = decode::<SessionClaims>(token, key, &validation)
            .map_err(|e| {
                tracing::debug!(target: "bo.services.token", error = %e, "Token verification failed");
                record_token_validation("error", Some("signature"));
                invalid()
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            tracing::debug!(target: "bo.services.token", exp = claims.exp, now = now, "Token expired");
            record_token_validation("error", Some("expired"));
            return Err(invalid());
        }

        if validate_iat_at(claims.iat, self.clock_skew, now).is_err() {
            record_token_validation("error", Some("clock_skew"));
            return Err(invalid());
        }

        record_token_validation("success", None);
        Ok(claims)
    }
}
