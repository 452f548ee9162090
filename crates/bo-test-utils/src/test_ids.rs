//! Fixed test values for deterministic tests
//!
//! The harness clock starts at [`test_start_time`] so relative meeting labels
//! and token expiry are reproducible.

use chrono::{DateTime, TimeZone, Utc};

/// Base64 session secret used by every test server (39 bytes decoded).
pub const TEST_JWT_SECRET_B64: &str = "Ym8tdGVzdC11dGlscy1zZXNzaW9uLXNlY3JldC0wMTIzNDU2Nzg5";

/// Raw bytes behind [`TEST_JWT_SECRET_B64`].
pub const TEST_JWT_SECRET: &[u8] = b"bo-test-utils-session-secret-0123456789";

/// A secret the server does not know.
pub const WRONG_JWT_SECRET: &[u8] = b"not-the-back-office-secret-0123456789";

// Tenant owners
pub const OWNER_EMAIL: &str = "owner@acme.com";
pub const OTHER_OWNER_EMAIL: &str = "owner@globex.com";

// Staff
pub const ADMIN_EMAIL: &str = "admin@acme.com";
pub const MEMBER_EMAIL: &str = "member@acme.com";
pub const SECOND_MEMBER_EMAIL: &str = "member2@acme.com";

/// Password of every seeded account.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Lowest cost the service accepts; keeps tests fast.
pub const TEST_BCRYPT_COST: u32 = 10;

/// 2024-01-10T10:00:00Z, a Wednesday.
pub fn test_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0)
        .single()
        .unwrap_or_default()
}
