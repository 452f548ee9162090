//! Postgres-backed [`Store`].

use super::{meetings, products, users, Store};
use crate::errors::BoError;
use crate::models::{Identity, Meeting, NewIdentity, NewMeeting, NewProduct, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::types::{MeetingId, ProductId, TenantId, UserId};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), BoError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BoError::Store(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_identity(&self, id: UserId) -> Result<Option<Identity>, BoError> {
        users::get_by_id(&self.pool, id).await
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, BoError> {
        users::get_by_email(&self.pool, email).await
    }

    async fn find_password_hash(&self, id: UserId) -> Result<Option<String>, BoError> {
        users::get_password_hash(&self.pool, id).await
    }

    async fn list_identities(&self, tenant: TenantId) -> Result<Vec<Identity>, BoError> {
        users::list_by_tenant(&self.pool, tenant).await
    }

    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, BoError> {
        users::create_user(&self.pool, &new).await
    }

    async fn update_identity(&self, identity: &Identity) -> Result<Identity, BoError> {
        users::update_user(&self.pool, identity).await
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), BoError> {
        users::set_password_hash(&self.pool, id, password_hash).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, BoError> {
        products::get_by_id(&self.pool, id).await
    }

    async fn find_active_product_by_brand(
        &self,
        tenant: TenantId,
        brand: &str,
    ) -> Result<Option<Product>, BoError> {
        products::get_active_by_brand(&self.pool, tenant, brand).await
    }

    async fn list_products(&self, tenant: TenantId) -> Result<Vec<Product>, BoError> {
        products::list_active_by_tenant(&self.pool, tenant).await
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, BoError> {
        products::create_product(&self.pool, &new).await
    }

    async fn update_product(&self, product: &Product) -> Result<Product, BoError> {
        products::update_product(&self.pool, product).await
    }

    async fn find_meeting_by_id(&self, id: MeetingId) -> Result<Option<Meeting>, BoError> {
        meetings::get_by_id(&self.pool, id).await
    }

    async fn find_meeting(
        &self,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<Option<Meeting>, BoError> {
        meetings::find_active_slot(&self.pool, product_id, time, tenant).await
    }

    async fn list_meetings(&self, tenant: TenantId) -> Result<Vec<Meeting>, BoError> {
        meetings::list_active_by_tenant(&self.pool, tenant).await
    }

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, BoError> {
        meetings::create_meeting(&self.pool, &new).await
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<Meeting, BoError> {
        meetings::update_meeting(&self.pool, meeting).await
    }
}
