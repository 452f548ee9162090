//! Common data types for Back Office components.
//!
//! Identifiers are thin wrappers over the store's `BIGSERIAL` keys. They
//! serialize as bare integers so the wire format stays `{"id": 42}`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw integer key.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Unique identifier for a user (any role)
    UserId
);

id_newtype!(
    /// Unique identifier for a product
    ProductId
);

id_newtype!(
    /// Unique identifier for a meeting
    MeetingId
);

id_newtype!(
    /// Identifier of a tenant partition.
    ///
    /// Numerically equal to the id of the SUPER_ADMIN that owns the tenant.
    TenantId
);

impl From<UserId> for TenantId {
    fn from(owner: UserId) -> Self {
        Self(owner.0)
    }
}
