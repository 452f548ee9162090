//! Persistence layer.
//!
//! [`Store`] is the narrow interface the services consume. [`PgStore`]
//! adapts the sqlx repository modules (`users`, `products`, `meetings`) to
//! it; [`InMemoryStore`] backs tests and the local harness.
//!
//! Every failure surfaces as `BoError::Store`, except unique-constraint
//! violations which map to `BoError::Conflict`.

pub mod meetings;
pub mod memory;
pub mod postgres;
pub mod products;
pub mod users;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::errors::BoError;
use crate::models::{Identity, Meeting, NewIdentity, NewMeeting, NewProduct, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::types::{MeetingId, ProductId, TenantId, UserId};

#[async_trait]
pub trait Store: Send + Sync {
    // ------------------------------------------------------------------
    // Identities
    // ------------------------------------------------------------------

    async fn find_identity(&self, id: UserId) -> Result<Option<Identity>, BoError>;

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, BoError>;

    /// `None` when the identity does not exist or has never registered.
    async fn find_password_hash(&self, id: UserId) -> Result<Option<String>, BoError>;

    /// Every identity whose effective tenant is `tenant`, owner included.
    async fn list_identities(&self, tenant: TenantId) -> Result<Vec<Identity>, BoError>;

    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, BoError>;

    /// Overwrite name, role, team and active flag.
    async fn update_identity(&self, identity: &Identity) -> Result<Identity, BoError>;

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), BoError>;

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Looks up active and disabled products alike.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, BoError>;

    async fn find_active_product_by_brand(
        &self,
        tenant: TenantId,
        brand: &str,
    ) -> Result<Option<Product>, BoError>;

    /// Active products of a tenant, ordered by id.
    async fn list_products(&self, tenant: TenantId) -> Result<Vec<Product>, BoError>;

    async fn create_product(&self, new: NewProduct) -> Result<Product, BoError>;

    /// Overwrite the product row and replace its member, category and tag sets.
    async fn update_product(&self, product: &Product) -> Result<Product, BoError>;

    // ------------------------------------------------------------------
    // Meetings
    // ------------------------------------------------------------------

    /// Looks up active and disabled meetings alike.
    async fn find_meeting_by_id(&self, id: MeetingId) -> Result<Option<Meeting>, BoError>;

    /// The active meeting at exactly `time` for this product and tenant.
    async fn find_meeting(
        &self,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<Option<Meeting>, BoError>;

    /// Active meetings of a tenant, ordered by time.
    async fn list_meetings(&self, tenant: TenantId) -> Result<Vec<Meeting>, BoError>;

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, BoError>;

    async fn update_meeting(&self, meeting: &Meeting) -> Result<Meeting, BoError>;
}

/// True for a Postgres unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
