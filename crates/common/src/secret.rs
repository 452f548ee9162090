//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports [`secrecy`] types. `SecretString` implements `Debug` with
//! redaction, so request bodies that derive `Debug` stay safe to log.
//!
//! Use `SecretString` for:
//! - User passwords in login, bootstrap and registration bodies
//! - The session signing secret (base64 text)
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     email: "owner@example.com".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{req:?}").contains("hunter2"));
//! assert_eq!(req.password.expose_secret(), "hunter2");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
