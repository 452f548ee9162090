//! Tenant-scoped product catalog.

use crate::errors::BoError;
use crate::models::{Identity, NewProduct, Product, ProductListResponse, ProductRequest};
use crate::repositories::Store;
use crate::services::access_filter::{
    check_product_access, check_write_ownership, narrow_products,
};
use crate::services::tenancy::effective_tenant_id;
use crate::services::validation::Validator;
use common::types::{ProductId, TenantId, UserId};
use std::collections::BTreeSet;
use tracing::instrument;

fn product_not_found(id: ProductId) -> BoError {
    BoError::NotFound(format!("Invalid product id {}!", id))
}

fn brand_taken(brand: &str) -> BoError {
    BoError::Conflict(format!("Brand {} is already saved as a product!", brand))
}

/// Trimmed, non-blank, de-duplicated tags.
fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every member must be a user of `tenant`; each stranger adds a field error.
async fn check_members(
    store: &dyn Store,
    v: &mut Validator,
    tenant: TenantId,
    members: &[UserId],
) -> Result<BTreeSet<UserId>, BoError> {
    if members.is_empty() {
        return Ok(BTreeSet::new());
    }

    let tenant_users: BTreeSet<UserId> = store
        .list_identities(tenant)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let mut accepted = BTreeSet::new();
    for id in members {
        if tenant_users.contains(id) {
            accepted.insert(*id);
        } else {
            v.push("members", format!("Invalid user id {}!", id));
        }
    }
    Ok(accepted)
}

/// Active products of the caller's tenant.
///
/// MEMBERs see only the products they belong to, or the whole list when they
/// belong to none.
#[instrument(skip_all, name = "bo.service.product.list")]
pub async fn list_products(
    store: &dyn Store,
    caller: &Identity,
) -> Result<ProductListResponse, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let products = store.list_products(tenant).await?;

    Ok(ProductListResponse {
        products: narrow_products(caller, products),
    })
}

#[instrument(skip_all, name = "bo.service.product.get", fields(product_id = %id))]
pub async fn get_product(
    store: &dyn Store,
    caller: &Identity,
    id: ProductId,
) -> Result<Product, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let product = store
        .find_product(id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| product_not_found(id))?;

    check_product_access(caller, tenant, &product)?;
    Ok(product)
}

#[instrument(skip_all, name = "bo.service.product.create")]
pub async fn create_product(
    store: &dyn Store,
    caller: &Identity,
    request: ProductRequest,
) -> Result<Product, BoError> {
    let tenant = effective_tenant_id(caller)?;
    check_write_ownership(caller, tenant, tenant)?;

    let mut v = Validator::new();
    let brand = v
        .required(request.brand.as_deref(), "brand", "Product brand")
        .map(str::to_string);
    let categories = v.categories(request.categories.as_deref().unwrap_or_default(), "categories");
    let members = check_members(
        store,
        &mut v,
        tenant,
        request.members.as_deref().unwrap_or_default(),
    )
    .await?;
    v.finish()?;
    let Some(brand) = brand else {
        return Err(BoError::invalid_field("brand", "Product brand field is empty!"));
    };

    if store
        .find_active_product_by_brand(tenant, &brand)
        .await?
        .is_some()
    {
        return Err(brand_taken(&brand));
    }

    let product = store
        .create_product(NewProduct {
            brand,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            owner_tenant_id: tenant,
            members,
            categories,
            tags: normalize_tags(request.tags.as_deref().unwrap_or_default()),
        })
        .await?;

    tracing::info!(
        target: "bo.services.product",
        product_id = %product.id,
        tenant = %tenant,
        created_by = %caller.id,
        "Product created"
    );
    Ok(product)
}

/// Replace the fields present in `request`; absent ones keep their value.
#[instrument(skip_all, name = "bo.service.product.update", fields(product_id = %id))]
pub async fn update_product(
    store: &dyn Store,
    caller: &Identity,
    id: ProductId,
    request: ProductRequest,
) -> Result<Product, BoError> {
    let tenant = effective_tenant_id(caller)?;

    let mut v = Validator::new();
    let brand = v
        .required(request.brand.as_deref(), "brand", "Product brand")
        .map(str::to_string);
    let categories = request
        .categories
        .as_deref()
        .map(|c| v.categories(c, "categories"));
    let members = match request.members.as_deref() {
        Some(m) => Some(check_members(store, &mut v, tenant, m).await?),
        None => None,
    };
    v.finish()?;
    let Some(brand) = brand else {
        return Err(BoError::invalid_field("brand", "Product brand field is empty!"));
    };

    let mut product = store
        .find_product(id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| product_not_found(id))?;

    check_write_ownership(caller, tenant, product.owner_tenant_id)?;

    if let Some(existing) = store.find_active_product_by_brand(tenant, &brand).await? {
        if existing.id != product.id {
            return Err(brand_taken(&brand));
        }
    }

    product.brand = brand;
    if let Some(description) = request.description {
        product.description = description.trim().to_string();
    }
    if let Some(categories) = categories {
        product.categories = categories;
    }
    if let Some(tags) = request.tags.as_deref() {
        product.tags = normalize_tags(tags);
    }
    if let Some(members) = members {
        product.members = members;
    }

    let product = store.update_product(&product).await?;
    tracing::info!(target: "bo.services.product", product_id = %product.id, updated_by = %caller.id, "Product updated");
    Ok(product)
}

/// Soft-delete. Disabling a disabled product succeeds without change.
#[instrument(skip_all, name = "bo.service.product.disable", fields(product_id = %id))]
pub async fn disable_product(
    store: &dyn Store,
    caller: &Identity,
    id: ProductId,
) -> Result<Product, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let mut product = store
        .find_product(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    check_write_ownership(caller, tenant, product.owner_tenant_id)?;

    if !product.active {
        return Ok(product);
    }

    product.active = false;
    let product = store.update_product(&product).await?;
    tracing::info!(target: "bo.services.product", product_id = %product.id, disabled_by = %caller.id, "Product disabled");
    Ok(product)
}
