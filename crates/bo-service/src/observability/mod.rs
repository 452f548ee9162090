//! Observability module for the Back Office service.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and log an explicit
//! allow-list of fields:
//! - **SAFE**: ids, roles, enum outcomes
//! - **HASHED**: e-mail addresses, via [`hash_for_correlation`]
//! - **NEVER**: passwords, tokens, the signing secret

pub mod metrics;

use crate::errors::BoError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Not suitable for protecting secrets. It only lets log lines about the same
/// e-mail be correlated without writing the address itself.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // Take first 8 hex chars (32 bits)
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, bad schedule
    Validation,
    /// Missing, invalid or expired credentials
    Authentication,
    /// Role or ownership violations
    Authorization,
    /// Missing or conflicting records
    State,
    /// Store, crypto, signing
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::State => "state",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&BoError> for ErrorCategory {
    fn from(err: &BoError) -> Self {
        match err {
            BoError::Validation(_) | BoError::InvalidSchedule(_) => ErrorCategory::Validation,
            BoError::Authentication(_) | BoError::InvalidToken(_) => {
                ErrorCategory::Authentication
            }
            BoError::Authorization | BoError::PermissionDenied(_) => ErrorCategory::Authorization,
            BoError::NotFound(_) | BoError::Conflict(_) => ErrorCategory::State,
            BoError::Store(_) | BoError::Crypto(_) | BoError::Signing(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
