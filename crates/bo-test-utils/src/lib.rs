//! # Back Office Test Utilities
//!
//! Shared test utilities for the Back Office service.
//!
//! This crate provides:
//! - Fixed test values (secret, clock start, e-mails, passwords)
//! - Session claims builder for forging tokens (expired, wrong secret, ...)
//! - Server test harness (`TestBackOfficeServer` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bo_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestBackOfficeServer::spawn().await?;
//!     let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
//!
//!     owner.token.assert_valid_session().assert_for_user(owner.identity.id);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
