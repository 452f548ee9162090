//! User repository module for database operations.
//!
//! Roles and teams are stored as text and parsed back into their enums when
//! rows are read. The password hash never leaves this module except through
//! [`get_password_hash`].

use super::is_unique_violation;
use crate::errors::BoError;
use crate::models::{Identity, NewIdentity, Role, Team};
use crate::observability::metrics::record_db_query;
use common::types::{TenantId, UserId};
use sqlx::PgPool;
use std::time::Instant;

/// User row (maps to users table, without the password hash)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub team: Option<String>,
    pub tenant_admin_id: Option<i64>,
    pub active: bool,
}

impl TryFrom<UserRow> for Identity {
    type Error = BoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| BoError::Store(format!("Corrupt role for user {}: {}", row.id, e)))?;
        let team = row
            .team
            .as_deref()
            .map(str::parse::<Team>)
            .transpose()
            .map_err(|e| BoError::Store(format!("Corrupt team for user {}: {}", row.id, e)))?;

        Ok(Identity {
            id: UserId(row.id),
            name: row.name,
            email: row.email,
            role,
            team,
            tenant_admin_id: row.tenant_admin_id.map(UserId),
            active: row.active,
        })
    }
}

fn record(operation: &str, start: Instant, ok: bool) {
    let status = if ok { "success" } else { "error" };
    record_db_query(operation, "users", status, start.elapsed());
}

/// Get user by id.
pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<Identity>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, role, team, tenant_admin_id, active
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to fetch user by id: {}", e)));
    record("select", start, row.is_ok());

    row?.map(Identity::try_from).transpose()
}

/// Get user by email. E-mail addresses are unique across all tenants.
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Identity>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, role, team, tenant_admin_id, active
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to fetch user by email: {}", e)));
    record("select", start, row.is_ok());

    row?.map(Identity::try_from).transpose()
}

/// Get the stored bcrypt hash for a user.
pub async fn get_password_hash(pool: &PgPool, id: UserId) -> Result<Option<String>, BoError> {
    let start = Instant::now();
    let hash = sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT password_hash
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to fetch password hash: {}", e)));
    record("select", start, hash.is_ok());

    Ok(hash?.flatten())
}

/// List every user of a tenant, the owning SUPER_ADMIN included.
pub async fn list_by_tenant(pool: &PgPool, tenant: TenantId) -> Result<Vec<Identity>, BoError> {
    let start = Instant::now();
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, role, team, tenant_admin_id, active
        FROM users
        WHERE id = $1 OR tenant_admin_id = $1
        ORDER BY id
        "#,
    )
    .bind(tenant.get())
    .fetch_all(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to list users: {}", e)));
    record("select", start, rows.is_ok());

    rows?.into_iter().map(Identity::try_from).collect()
}

/// Create a new user.
///
/// Returns `BoError::Conflict` when the e-mail is already taken.
pub async fn create_user(pool: &PgPool, new: &NewIdentity) -> Result<Identity, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, role, team, tenant_admin_id, active, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, email, role, team, tenant_admin_id, active
        "#,
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(new.role.as_str())
    .bind(new.team.map(|t| t.as_str()))
    .bind(new.tenant_admin_id.map(UserId::get))
    .bind(new.active)
    .bind(new.password_hash.as_deref())
    .fetch_one(pool)
    .await;
    record("insert", start, row.is_ok());

    let row = row.map_err(|e| {
        if is_unique_violation(&e) {
            BoError::Conflict(format!("User {} is already registered!", new.email))
        } else {
            BoError::Store(format!("Failed to create user: {}", e))
        }
    })?;

    Identity::try_from(row)
}

/// Overwrite the mutable columns of a user.
pub async fn update_user(pool: &PgPool, identity: &Identity) -> Result<Identity, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET name = $2, role = $3, team = $4, active = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, email, role, team, tenant_admin_id, active
        "#,
    )
    .bind(identity.id.get())
    .bind(&identity.name)
    .bind(identity.role.as_str())
    .bind(identity.team.map(|t| t.as_str()))
    .bind(identity.active)
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to update user: {}", e)));
    record("update", start, row.is_ok());

    let row = row?.ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", identity.id)))?;
    Identity::try_from(row)
}

/// Replace a user's password hash.
pub async fn set_password_hash(
    pool: &PgPool,
    id: UserId,
    password_hash: &str,
) -> Result<(), BoError> {
    let start = Instant::now();
    let result = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to update password hash: {}", e)));
    record("update", start, result.is_ok());

    if result?.rows_affected() == 0 {
        return Err(BoError::NotFound(format!("Invalid user id {}!", id)));
    }

    Ok(())
}
