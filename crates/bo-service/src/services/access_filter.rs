//! Tenant- and membership-scoped access rules.
//!
//! Everything here is a pure function of the caller, the caller's effective
//! tenant and the resource. Handlers load the resource, then ask this module
//! whether the caller may see or change it.
//!
//! Denials carry the same `PermissionDenied` message regardless of which rule
//! fired.

use crate::errors::BoError;
use crate::models::{Identity, Meeting, Product, Role};
use crate::services::tenancy::effective_tenant_id;
use common::types::TenantId;

pub const PERMISSION_DENIED: &str = "Permission denied!";

fn deny(rule: &'static str, caller: &Identity) -> BoError {
    tracing::debug!(
        target: "bo.services.access",
        rule = rule,
        user_id = %caller.id,
        role = %caller.role,
        "Access denied"
    );
    BoError::PermissionDenied(PERMISSION_DENIED.to_string())
}

// ============================================================================
// List narrowing
// ============================================================================

/// Narrow a tenant's products to the ones a MEMBER belongs to.
///
/// A MEMBER that belongs to no product at all gets the unfiltered list back.
/// Other roles always see the full list.
pub fn narrow_products(caller: &Identity, products: Vec<Product>) -> Vec<Product> {
    if caller.role != Role::Member {
        return products;
    }

    let member_of: Vec<Product> = products
        .iter()
        .filter(|p| p.has_member(caller.id))
        .cloned()
        .collect();

    if member_of.is_empty() {
        products
    } else {
        member_of
    }
}

/// True if `caller` is a member of at least one of `products`.
pub fn has_any_membership(caller: &Identity, products: &[Product]) -> bool {
    products.iter().any(|p| p.has_member(caller.id))
}

// ============================================================================
// Singleton reads
// ============================================================================

/// May `caller` read `target`'s user record?
///
/// Callers can always read themselves. Otherwise the target must share the
/// caller's tenant, and a MEMBER may not read ADMIN or SUPER_ADMIN records.
pub fn check_user_access(
    caller: &Identity,
    caller_tenant: TenantId,
    target: &Identity,
) -> Result<(), BoError> {
    if caller.id == target.id {
        return Ok(());
    }

    match effective_tenant_id(target) {
        Ok(tenant) if tenant == caller_tenant => {}
        _ => return Err(deny("user_other_tenant", caller)),
    }

    if caller.role == Role::Member && target.role.is_privileged() {
        return Err(deny("member_reads_privileged", caller));
    }

    Ok(())
}

/// May `caller` read `product`?
pub fn check_product_access(
    caller: &Identity,
    caller_tenant: TenantId,
    product: &Product,
) -> Result<(), BoError> {
    if product.owner_tenant_id != caller_tenant {
        return Err(deny("product_other_tenant", caller));
    }

    if caller.role == Role::Member && !product.has_member(caller.id) {
        return Err(deny("product_not_member", caller));
    }

    Ok(())
}

/// May `caller` read `meeting`?
///
/// A MEMBER needs at least one membership among `tenant_products`; the
/// membership does not have to be on the meeting's own product.
pub fn check_meeting_access(
    caller: &Identity,
    caller_tenant: TenantId,
    meeting: &Meeting,
    tenant_products: &[Product],
) -> Result<(), BoError> {
    if meeting.owner_tenant_id != caller_tenant {
        return Err(deny("meeting_other_tenant", caller));
    }

    if caller.role == Role::Member && !has_any_membership(caller, tenant_products) {
        return Err(deny("meeting_no_membership", caller));
    }

    Ok(())
}

// ============================================================================
// Writes
// ============================================================================

/// Mutating a product or meeting requires a non-MEMBER caller in the owning
/// tenant.
pub fn check_write_ownership(
    caller: &Identity,
    caller_tenant: TenantId,
    owner_tenant: TenantId,
) -> Result<(), BoError> {
    if caller.role == Role::Member {
        return Err(deny("member_write", caller));
    }

    if owner_tenant != caller_tenant {
        return Err(deny("write_other_tenant", caller));
    }

    Ok(())
}

/// Role-escalation guard for invites (`target_current == None`) and updates.
///
/// - an ADMIN may never hand out SUPER_ADMIN
/// - nobody becomes SUPER_ADMIN through invite or update
/// - a SUPER_ADMIN's role is fixed
pub fn check_role_assignment(
    caller: &Identity,
    target_current: Option<Role>,
    new_role: Role,
) -> Result<(), BoError> {
    if caller.role == Role::Admin && new_role == Role::SuperAdmin {
        return Err(deny("admin_grants_super_admin", caller));
    }

    match (target_current, new_role) {
        (Some(Role::SuperAdmin), Role::SuperAdmin) => Ok(()),
        (Some(Role::SuperAdmin), _) => Err(deny("super_admin_role_fixed", caller)),
        (_, Role::SuperAdmin) => Err(deny("promote_to_super_admin", caller)),
        _ => Ok(()),
    }
}

/// May `caller` disable `target`?
///
/// Denied for oneself, for users of another tenant and for an ADMIN
/// disabling a SUPER_ADMIN.
pub fn check_disable_target(
    caller: &Identity,
    caller_tenant: TenantId,
    target: &Identity,
) -> Result<(), BoError> {
    if caller.id == target.id {
        return Err(deny("disable_self", caller));
    }

    match effective_tenant_id(target) {
        Ok(tenant) if tenant == caller_tenant => {}
        _ => return Err(deny("disable_other_tenant", caller)),
    }

    if caller.role == Role::Admin && target.role == Role::SuperAdmin {
        return Err(deny("admin_disables_super_admin", caller));
    }

    Ok(())
}
