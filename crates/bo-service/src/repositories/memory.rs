//! In-memory [`Store`] for tests and local runs without Postgres.
//!
//! Enforces the same uniqueness rules as the schema:
//! - e-mail addresses are unique across all tenants
//! - an active brand is unique within a tenant
//!
//! [`InMemoryStore::set_unavailable`] makes every call fail with
//! `BoError::Store`, which lets tests exercise the store-down paths.

use super::Store;
use crate::errors::BoError;
use crate::models::{Identity, Meeting, NewIdentity, NewMeeting, NewProduct, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::types::{MeetingId, ProductId, TenantId, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, (Identity, Option<String>)>,
    products: BTreeMap<ProductId, Product>,
    meetings: BTreeMap<MeetingId, Meeting>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn brand_taken(&self, tenant: TenantId, brand: &str, except: Option<ProductId>) -> bool {
        self.products.values().any(|p| {
            p.active && p.owner_tenant_id == tenant && p.brand == brand && Some(p.id) != except
        })
    }
}

/// Identity's effective tenant as stored (no validation).
fn tenant_of(identity: &Identity) -> TenantId {
    match identity.tenant_admin_id {
        Some(admin) => TenantId::from(admin),
        None => TenantId::from(identity.id),
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), BoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BoError::Store("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_identity(&self, id: UserId) -> Result<Option<Identity>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|(identity, _)| identity.clone()))
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|(identity, _)| identity.email == email)
            .map(|(identity, _)| identity.clone()))
    }

    async fn find_password_hash(&self, id: UserId) -> Result<Option<String>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).and_then(|(_, hash)| hash.clone()))
    }

    async fn list_identities(&self, tenant: TenantId) -> Result<Vec<Identity>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|(identity, _)| tenant_of(identity) == tenant)
            .map(|(identity, _)| identity.clone())
            .collect())
    }

    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|(i, _)| i.email == new.email) {
            return Err(BoError::Conflict(format!(
                "User {} is already registered!",
                new.email
            )));
        }

        let identity = Identity {
            id: UserId(tables.allocate_id()),
            name: new.name,
            email: new.email,
            role: new.role,
            team: new.team,
            tenant_admin_id: new.tenant_admin_id,
            active: new.active,
        };
        tables
            .users
            .insert(identity.id, (identity.clone(), new.password_hash));
        Ok(identity)
    }

    async fn update_identity(&self, identity: &Identity) -> Result<Identity, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let (stored, _) = tables
            .users
            .get_mut(&identity.id)
            .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", identity.id)))?;

        stored.name = identity.name.clone();
        stored.role = identity.role;
        stored.team = identity.team;
        stored.active = identity.active;
        Ok(stored.clone())
    }

    async fn set_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let (_, hash) = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", id)))?;
        *hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn find_active_product_by_brand(
        &self,
        tenant: TenantId,
        brand: &str,
    ) -> Result<Option<Product>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .find(|p| p.active && p.owner_tenant_id == tenant && p.brand == brand)
            .cloned())
    }

    async fn list_products(&self, tenant: TenantId) -> Result<Vec<Product>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.active && p.owner_tenant_id == tenant)
            .cloned()
            .collect())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.brand_taken(new.owner_tenant_id, &new.brand, None) {
            return Err(BoError::Conflict(format!(
                "Brand {} is already saved as a product!",
                new.brand
            )));
        }

        let product = Product {
            id: ProductId(tables.allocate_id()),
            brand: new.brand,
            description: new.description,
            owner_tenant_id: new.owner_tenant_id,
            active: true,
            members: new.members,
            categories: new.categories,
            tags: new.tags,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if product.active
            && tables.brand_taken(product.owner_tenant_id, &product.brand, Some(product.id))
        {
            return Err(BoError::Conflict(format!(
                "Brand {} is already saved as a product!",
                product.brand
            )));
        }

        let stored = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| BoError::NotFound(format!("Invalid product id {}!", product.id)))?;
        *stored = product.clone();
        Ok(product.clone())
    }

    async fn find_meeting_by_id(&self, id: MeetingId) -> Result<Option<Meeting>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.meetings.get(&id).cloned())
    }

    async fn find_meeting(
        &self,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<Option<Meeting>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .meetings
            .values()
            .find(|m| {
                m.active
                    && m.product_id == product_id
                    && m.time == time
                    && m.owner_tenant_id == tenant
            })
            .cloned())
    }

    async fn list_meetings(&self, tenant: TenantId) -> Result<Vec<Meeting>, BoError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut meetings: Vec<Meeting> = tables
            .meetings
            .values()
            .filter(|m| m.active && m.owner_tenant_id == tenant)
            .cloned()
            .collect();
        meetings.sort_by_key(|m| (m.time, m.id));
        Ok(meetings)
    }

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let meeting = Meeting {
            id: MeetingId(tables.allocate_id()),
            product_id: new.product_id,
            time: new.time,
            owner_tenant_id: new.owner_tenant_id,
            active: true,
        };
        tables.meetings.insert(meeting.id, meeting.clone());
        Ok(meeting)
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<Meeting, BoError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .meetings
            .get_mut(&meeting.id)
            .ok_or_else(|| BoError::NotFound(format!("Invalid meeting id {}!", meeting.id)))?;
        *stored = meeting.clone();
        Ok(meeting.clone())
    }
}
