//! Back Office configuration.
//!
//! Configuration is loaded once from environment variables at process start
//! and handed to the components that need it. Sensitive fields are redacted
//! in Debug output.

use base64::{engine::general_purpose, Engine as _};
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Default JWT clock skew tolerance in seconds.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = DEFAULT_CLOCK_SKEW.as_secs() as i64;

/// Default bcrypt cost factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost factor.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost factor.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default maximum number of pooled database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Minimum decoded length of the session signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:3000").
    pub bind_address: String,

    /// Base64-encoded HS256 session signing secret.
    pub jwt_secret: SecretString,

    /// JWT clock skew tolerance in seconds for `iat` validation.
    pub jwt_clock_skew_seconds: i64,

    /// Bcrypt cost factor used when hashing passwords.
    pub bcrypt_cost: u32,

    pub db_max_connections: u32,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid database pool configuration: {0}")]
    InvalidDbMaxConnections(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret_base64 = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let decoded = general_purpose::STANDARD
            .decode(jwt_secret_base64)
            .map_err(|e| ConfigError::InvalidJwtSecret(format!("not valid base64: {}", e)))?;

        if decoded.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                decoded.len()
            )));
        }

        let jwt_secret = SecretString::from(jwt_secret_base64.clone());

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_JWT_CLOCK_SKEW_SECONDS
        };

        // Parse bcrypt cost with validation
        let bcrypt_cost = if let Some(value_str) = vars.get("BCRYPT_COST") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&value) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, value
                )));
            }

            value
        } else {
            DEFAULT_BCRYPT_COST
        };

        let db_max_connections = if let Some(value_str) = vars.get("DB_MAX_CONNECTIONS") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidDbMaxConnections(format!(
                    "DB_MAX_CONNECTIONS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidDbMaxConnections(
                    "DB_MAX_CONNECTIONS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_DB_MAX_CONNECTIONS
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            jwt_clock_skew_seconds,
            bcrypt_cost,
            db_max_connections,
        })
    }

    /// Decoded signing secret bytes.
    ///
    /// `from_vars` has already checked the encoding, so a decode failure here
    /// only happens for configs assembled by hand.
    pub fn jwt_secret_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        general_purpose::STANDARD
            .decode(self.jwt_secret.expose_secret())
            .map_err(|e| ConfigError::InvalidJwtSecret(format!("not valid base64: {}", e)))
    }
}
