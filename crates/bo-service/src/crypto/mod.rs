//! Password hashing.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::BoError;
use crate::observability::metrics::record_bcrypt_duration;
use std::time::Instant;
use tracing::instrument;

/// Hash a password with bcrypt using a configurable cost factor.
///
/// Cost must lie in `MIN_BCRYPT_COST..=MAX_BCRYPT_COST`. Config loading
/// already validates it; the check is repeated here for callers that build a
/// cost by hand.
///
/// # Errors
///
/// Returns `BoError::Crypto` if the cost is out of range or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, BoError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(BoError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    let start = Instant::now();
    let hash = bcrypt::hash(password, cost)
        .map_err(|e| BoError::Crypto(format!("Password hashing failed: {}", e)))?;
    record_bcrypt_duration("hash", start.elapsed());

    Ok(hash)
}

/// Verify a password against a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BoError> {
    let start = Instant::now();
    let matches = bcrypt::verify(password, hash)
        .map_err(|e| BoError::Crypto(format!("Password verification failed: {}", e)))?;
    record_bcrypt_duration("verify", start.elapsed());

    Ok(matches)
}
