//! Product repository module for database operations.
//!
//! A product is one row in `products` plus three side tables
//! (`product_members`, `product_categories`, `product_tags`). Reads assemble
//! the sets with one query per side table; writes replace the side tables
//! inside the same transaction as the row.

use super::is_unique_violation;
use crate::errors::BoError;
use crate::models::{Category, NewProduct, Product};
use crate::observability::metrics::record_db_query;
use common::types::{ProductId, TenantId, UserId};
use sqlx::{PgConnection, PgPool};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub brand: String,
    pub description: String,
    pub owner_tenant_id: i64,
    pub active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    product_id: i64,
    user_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    product_id: i64,
    category: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    product_id: i64,
    tag: String,
}

fn record(operation: &str, table: &str, start: Instant, ok: bool) {
    let status = if ok { "success" } else { "error" };
    record_db_query(operation, table, status, start.elapsed());
}

fn store_err(context: &str) -> impl Fn(sqlx::Error) -> BoError + '_ {
    move |e| BoError::Store(format!("{}: {}", context, e))
}

/// Load the side tables for `rows` and build full products, preserving row order.
async fn hydrate(pool: &PgPool, rows: Vec<ProductRow>) -> Result<Vec<Product>, BoError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let start = Instant::now();

    let members = sqlx::query_as::<_, MemberRow>(
        "SELECT product_id, user_id FROM product_members WHERE product_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(store_err("Failed to fetch product members"))?;

    let categories = sqlx::query_as::<_, CategoryRow>(
        "SELECT product_id, category FROM product_categories WHERE product_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(store_err("Failed to fetch product categories"))?;

    let tags = sqlx::query_as::<_, TagRow>(
        "SELECT product_id, tag FROM product_tags WHERE product_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(store_err("Failed to fetch product tags"))?;

    record("select", "product_side_tables", start, true);

    let mut by_id: BTreeMap<i64, Product> = BTreeMap::new();
    for row in rows {
        by_id.insert(
            row.id,
            Product {
                id: ProductId(row.id),
                brand: row.brand,
                description: row.description,
                owner_tenant_id: TenantId(row.owner_tenant_id),
                active: row.active,
                members: BTreeSet::new(),
                categories: BTreeSet::new(),
                tags: BTreeSet::new(),
            },
        );
    }

    for m in members {
        if let Some(product) = by_id.get_mut(&m.product_id) {
            product.members.insert(UserId(m.user_id));
        }
    }
    for c in categories {
        let category: Category = c.category.parse().map_err(|e| {
            BoError::Store(format!("Corrupt category for product {}: {}", c.product_id, e))
        })?;
        if let Some(product) = by_id.get_mut(&c.product_id) {
            product.categories.insert(category);
        }
    }
    for t in tags {
        if let Some(product) = by_id.get_mut(&t.product_id) {
            product.tags.insert(t.tag);
        }
    }

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

async fn replace_side_tables(
    conn: &mut PgConnection,
    product_id: i64,
    members: &BTreeSet<UserId>,
    categories: &BTreeSet<Category>,
    tags: &BTreeSet<String>,
) -> Result<(), BoError> {
    let member_ids: Vec<i64> = members.iter().map(|m| m.get()).collect();
    let category_names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    let tag_values: Vec<&str> = tags.iter().map(String::as_str).collect();

    sqlx::query("DELETE FROM product_members WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .map_err(store_err("Failed to clear product members"))?;
    sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .map_err(store_err("Failed to clear product categories"))?;
    sqlx::query("DELETE FROM product_tags WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .map_err(store_err("Failed to clear product tags"))?;

    sqlx::query(
        "INSERT INTO product_members (product_id, user_id) SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(product_id)
    .bind(&member_ids)
    .execute(&mut *conn)
    .await
    .map_err(store_err("Failed to insert product members"))?;
    sqlx::query(
        "INSERT INTO product_categories (product_id, category) SELECT $1, UNNEST($2::TEXT[])",
    )
    .bind(product_id)
    .bind(&category_names)
    .execute(&mut *conn)
    .await
    .map_err(store_err("Failed to insert product categories"))?;
    sqlx::query("INSERT INTO product_tags (product_id, tag) SELECT $1, UNNEST($2::TEXT[])")
        .bind(product_id)
        .bind(&tag_values)
        .execute(&mut *conn)
        .await
        .map_err(store_err("Failed to insert product tags"))?;

    Ok(())
}

/// Get product by id (active or disabled).
pub async fn get_by_id(pool: &PgPool, id: ProductId) -> Result<Option<Product>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, brand, description, owner_tenant_id, active
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(pool)
    .await
    .map_err(store_err("Failed to fetch product by id"));
    record("select", "products", start, row.is_ok());

    match row? {
        Some(row) => Ok(hydrate(pool, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

/// Get the active product of a tenant carrying `brand`.
pub async fn get_active_by_brand(
    pool: &PgPool,
    tenant: TenantId,
    brand: &str,
) -> Result<Option<Product>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, brand, description, owner_tenant_id, active
        FROM products
        WHERE owner_tenant_id = $1 AND brand = $2 AND active = TRUE
        "#,
    )
    .bind(tenant.get())
    .bind(brand)
    .fetch_optional(pool)
    .await
    .map_err(store_err("Failed to fetch product by brand"));
    record("select", "products", start, row.is_ok());

    match row? {
        Some(row) => Ok(hydrate(pool, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

/// List the active products of a tenant.
pub async fn list_active_by_tenant(
    pool: &PgPool,
    tenant: TenantId,
) -> Result<Vec<Product>, BoError> {
    let start = Instant::now();
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, brand, description, owner_tenant_id, active
        FROM products
        WHERE owner_tenant_id = $1 AND active = TRUE
        ORDER BY id
        "#,
    )
    .bind(tenant.get())
    .fetch_all(pool)
    .await
    .map_err(store_err("Failed to list products"));
    record("select", "products", start, rows.is_ok());

    hydrate(pool, rows?).await
}

/// Create a product with its side tables.
pub async fn create_product(pool: &PgPool, new: &NewProduct) -> Result<Product, BoError> {
    let start = Instant::now();
    let mut tx = pool
        .begin()
        .await
        .map_err(store_err("Failed to begin transaction"))?;

    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO products (brand, description, owner_tenant_id, active)
        VALUES ($1, $2, $3, TRUE)
        RETURNING id, brand, description, owner_tenant_id, active
        "#,
    )
    .bind(&new.brand)
    .bind(&new.description)
    .bind(new.owner_tenant_id.get())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            BoError::Conflict(format!("Brand {} is already saved as a product!", new.brand))
        } else {
            BoError::Store(format!("Failed to create product: {}", e))
        }
    })?;

    replace_side_tables(&mut tx, row.id, &new.members, &new.categories, &new.tags).await?;

    tx.commit()
        .await
        .map_err(store_err("Failed to commit product"))?;
    record("insert", "products", start, true);

    Ok(Product {
        id: ProductId(row.id),
        brand: row.brand,
        description: row.description,
        owner_tenant_id: TenantId(row.owner_tenant_id),
        active: row.active,
        members: new.members.clone(),
        categories: new.categories.clone(),
        tags: new.tags.clone(),
    })
}

/// Overwrite a product row and replace its side tables.
pub async fn update_product(pool: &PgPool, product: &Product) -> Result<Product, BoError> {
    let start = Instant::now();
    let mut tx = pool
        .begin()
        .await
        .map_err(store_err("Failed to begin transaction"))?;

    let updated = sqlx::query(
        r#"
        UPDATE products
        SET brand = $2, description = $3, active = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(product.id.get())
    .bind(&product.brand)
    .bind(&product.description)
    .bind(product.active)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            BoError::Conflict(format!(
                "Brand {} is already saved as a product!",
                product.brand
            ))
        } else {
            BoError::Store(format!("Failed to update product: {}", e))
        }
    })?;

    if updated.rows_affected() == 0 {
        return Err(BoError::NotFound(format!(
            "Invalid product id {}!",
            product.id
        )));
    }

    replace_side_tables(
        &mut tx,
        product.id.get(),
        &product.members,
        &product.categories,
        &product.tags,
    )
    .await?;

    tx.commit()
        .await
        .map_err(store_err("Failed to commit product"))?;
    record("update", "products", start, true);

    Ok(product.clone())
}
