//! Effective tenant resolution.
//!
//! A SUPER_ADMIN owns its own tenant; ADMIN and MEMBER identities belong to
//! the tenant of the SUPER_ADMIN that invited them. Resolution is a single
//! hop and is recomputed on every request.

use crate::errors::BoError;
use crate::models::{Identity, Role};
use common::types::TenantId;

/// Tenant whose data `identity` may see.
///
/// An ADMIN or MEMBER without an owning SUPER_ADMIN is rejected with
/// `PermissionDenied`. The schema forbids that shape, so it only shows up
/// for hand-built claims.
pub fn effective_tenant_id(identity: &Identity) -> Result<TenantId, BoError> {
    match identity.role {
        Role::SuperAdmin => Ok(TenantId::from(identity.id)),
        Role::Admin | Role::Member => identity
            .tenant_admin_id
            .map(TenantId::from)
            .ok_or_else(|| {
                tracing::warn!(
                    target: "bo.services.tenancy",
                    user_id = %identity.id,
                    "Identity has no owning tenant"
                );
                BoError::PermissionDenied("Permission denied!".to_string())
            }),
    }
}
