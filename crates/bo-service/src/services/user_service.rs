//! User accounts: tenant bootstrap, login, invitation, registration and
//! tenant-scoped user management.
//!
//! # Lifecycle
//!
//! 1. A SUPER_ADMIN bootstraps a tenant and is active immediately.
//! 2. SUPER_ADMIN or ADMIN invites staff, who are created inactive without a
//!    password.
//! 3. The invitee registers with their id and e-mail, sets a password and
//!    becomes active.
//! 4. Staff can be disabled again; nothing is ever deleted.

use crate::crypto;
use crate::errors::BoError;
use crate::models::{
    BootstrapRequest, Identity, InviteUserRequest, LoginRequest, NewIdentity, RegisterRequest,
    Role, UpdateUserRequest, UserListResponse,
};
use crate::observability::hash_for_correlation;
use crate::repositories::Store;
use crate::services::access_filter::{
    check_disable_target, check_role_assignment, check_user_access, PERMISSION_DENIED,
};
use crate::services::tenancy::effective_tenant_id;
use crate::services::token_service::TokenService;
use crate::services::validation::Validator;
use common::secret::{ExposeSecret, SecretString};
use common::types::UserId;
use tracing::instrument;

pub const LOGIN_FAILED: &str = "Invalid email or password!";

/// Verified against when the account has no usable hash, so a login for an
/// unknown address costs the same bcrypt work as a real one.
const DUMMY_BCRYPT_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// An identity together with a freshly issued session token.
#[derive(Debug)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

fn secret_str(value: &Option<SecretString>) -> Option<&str> {
    value.as_ref().map(|s| s.expose_secret())
}

/// Create a new tenant owned by an active SUPER_ADMIN.
#[instrument(skip_all, name = "bo.service.user.bootstrap")]
pub async fn bootstrap_tenant(
    store: &dyn Store,
    tokens: &TokenService,
    bcrypt_cost: u32,
    request: BootstrapRequest,
) -> Result<Session, BoError> {
    let mut v = Validator::new();
    let name = v.required(request.name.as_deref(), "name", "Admin name");
    let email = v.email(request.email.as_deref(), "email");
    let password = v.required(secret_str(&request.password), "password", "Admin password");
    v.finish()?;
    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    if store.find_identity_by_email(email).await?.is_some() {
        return Err(BoError::Conflict(format!(
            "Admin {} is already registered!",
            email
        )));
    }

    let password_hash = crypto::hash_password(password, bcrypt_cost)?;

    let identity = store
        .create_identity(NewIdentity {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::SuperAdmin,
            team: None,
            tenant_admin_id: None,
            active: true,
            password_hash: Some(password_hash),
        })
        .await?;

    let token = tokens.issue(&identity)?;

    tracing::info!(
        target: "bo.services.user",
        user_id = %identity.id,
        email_hash = %hash_for_correlation(&identity.email),
        "Tenant bootstrapped"
    );

    Ok(Session { identity, token })
}

/// Exchange e-mail and password for a session.
#[instrument(skip_all, name = "bo.service.user.login")]
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    request: LoginRequest,
) -> Result<Session, BoError> {
    let mut v = Validator::new();
    let email = v.email(request.email.as_deref(), "email");
    let password = v.required(secret_str(&request.password), "password", "User password");
    v.finish()?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    let identity = store.find_identity_by_email(email).await?;
    let stored_hash = match &identity {
        Some(i) => store.find_password_hash(i.id).await?,
        None => None,
    };

    // Always run bcrypt, even for unknown accounts
    let hash_to_verify = stored_hash.as_deref().unwrap_or(DUMMY_BCRYPT_HASH);
    let is_valid = crypto::verify_password(password, hash_to_verify)?;

    let identity = match identity {
        Some(i) if is_valid && stored_hash.is_some() => i,
        _ => {
            tracing::debug!(
                target: "bo.services.user",
                email_hash = %hash_for_correlation(email),
                "Login rejected"
            );
            return Err(BoError::Authentication(LOGIN_FAILED.to_string()));
        }
    };

    if !identity.active {
        tracing::debug!(target: "bo.services.user", user_id = %identity.id, "Login rejected: inactive");
        return Err(BoError::Authentication(format!(
            "User {} is inactive!",
            identity.email
        )));
    }

    let token = tokens.issue(&identity)?;
    tracing::info!(target: "bo.services.user", user_id = %identity.id, "User logged in");

    Ok(Session { identity, token })
}

/// Activate an invited identity by setting its password.
#[instrument(skip_all, name = "bo.service.user.register")]
pub async fn register_user(
    store: &dyn Store,
    tokens: &TokenService,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<Session, BoError> {
    let mut v = Validator::new();
    if request.id.is_none() {
        v.push("id", "User id field is empty!");
    }
    let email = v.email(request.email.as_deref(), "email");
    let password = v.required(secret_str(&request.password), "password", "User password");
    v.finish()?;
    let (Some(id), Some(email), Some(password)) = (request.id, email, password) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    let mut identity = store
        .find_identity(id)
        .await?
        .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", id)))?;

    if identity.email != email {
        return Err(BoError::PermissionDenied(PERMISSION_DENIED.to_string()));
    }

    // A disabled user keeps its password hash; only invitees have none.
    if identity.active || store.find_password_hash(identity.id).await?.is_some() {
        return Err(BoError::Conflict(format!(
            "User {} is already registered!",
            email
        )));
    }

    let password_hash = crypto::hash_password(password, bcrypt_cost)?;
    store.set_password_hash(identity.id, &password_hash).await?;

    identity.active = true;
    let identity = store.update_identity(&identity).await?;
    let token = tokens.issue(&identity)?;

    tracing::info!(target: "bo.services.user", user_id = %identity.id, "User registered");

    Ok(Session { identity, token })
}

/// Every user of the caller's tenant, split by active flag.
#[instrument(skip_all, name = "bo.service.user.list")]
pub async fn list_users(store: &dyn Store, caller: &Identity) -> Result<UserListResponse, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let (active_users, inactive_users): (Vec<Identity>, Vec<Identity>) = store
        .list_identities(tenant)
        .await?
        .into_iter()
        .partition(|i| i.active);

    Ok(UserListResponse {
        active_users,
        inactive_users,
    })
}

#[instrument(skip_all, name = "bo.service.user.get", fields(target_id = %id))]
pub async fn get_user(store: &dyn Store, caller: &Identity, id: UserId) -> Result<Identity, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let target = store
        .find_identity(id)
        .await?
        .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", id)))?;

    check_user_access(caller, tenant, &target)?;
    Ok(target)
}

/// Create an inactive ADMIN or MEMBER in the caller's tenant.
///
/// No message is delivered to the invitee; the returned id is what they
/// register with.
#[instrument(skip_all, name = "bo.service.user.invite")]
pub async fn invite_user(
    store: &dyn Store,
    caller: &Identity,
    request: InviteUserRequest,
) -> Result<Identity, BoError> {
    let mut v = Validator::new();
    let name = v.required(request.name.as_deref(), "name", "User name");
    let email = v.email(request.email.as_deref(), "email");
    let role = v.role(request.role.as_deref(), "role");
    let team = v.team(request.team.as_deref(), "team");
    v.finish()?;
    let (Some(name), Some(email), Some(role), Some(team)) = (name, email, role, team) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    check_role_assignment(caller, None, role)?;
    let tenant = effective_tenant_id(caller)?;

    if store.find_identity_by_email(email).await?.is_some() {
        return Err(BoError::Conflict(format!(
            "User {} is already invited!",
            email
        )));
    }

    let identity = store
        .create_identity(NewIdentity {
            name: name.to_string(),
            email: email.to_string(),
            role,
            team: Some(team),
            tenant_admin_id: Some(UserId(tenant.get())),
            active: false,
            password_hash: None,
        })
        .await?;

    tracing::info!(
        target: "bo.services.user",
        user_id = %identity.id,
        invited_by = %caller.id,
        role = %identity.role,
        "User invited"
    );

    Ok(identity)
}

/// Update name, role and team of a user of the caller's tenant.
///
/// A password in the request is applied only when callers update themselves;
/// otherwise it is ignored. An absent team keeps the stored one.
#[instrument(skip_all, name = "bo.service.user.update", fields(target_id = %id))]
pub async fn update_user(
    store: &dyn Store,
    bcrypt_cost: u32,
    caller: &Identity,
    id: UserId,
    request: UpdateUserRequest,
) -> Result<Identity, BoError> {
    let mut v = Validator::new();
    let name = v.required(request.name.as_deref(), "name", "User name");
    let role = v.role(request.role.as_deref(), "role");
    let team = v.optional_team(request.team.as_deref(), "team");
    v.finish()?;
    let (Some(name), Some(role)) = (name, role) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    let tenant = effective_tenant_id(caller)?;
    let mut target = store
        .find_identity(id)
        .await?
        .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", id)))?;

    check_user_access(caller, tenant, &target)?;
    check_role_assignment(caller, Some(target.role), role)?;

    if caller.id == target.id {
        if let Some(password) = secret_str(&request.password).map(str::trim) {
            if !password.is_empty() {
                let password_hash = crypto::hash_password(password, bcrypt_cost)?;
                store.set_password_hash(target.id, &password_hash).await?;
            }
        }
    }

    target.name = name.to_string();
    target.role = role;
    target.team = team.or(target.team);
    let updated = store.update_identity(&target).await?;

    tracing::info!(target: "bo.services.user", user_id = %updated.id, updated_by = %caller.id, "User updated");
    Ok(updated)
}

/// Deactivate a user. Disabling an inactive user succeeds without change.
#[instrument(skip_all, name = "bo.service.user.disable", fields(target_id = %id))]
pub async fn disable_user(
    store: &dyn Store,
    caller: &Identity,
    id: UserId,
) -> Result<Identity, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let mut target = store
        .find_identity(id)
        .await?
        .ok_or_else(|| BoError::NotFound(format!("Invalid user id {}!", id)))?;

    check_disable_target(caller, tenant, &target)?;

    if !target.active {
        return Ok(target);
    }

    target.active = false;
    let updated = store.update_identity(&target).await?;

    tracing::info!(target: "bo.services.user", user_id = %updated.id, disabled_by = %caller.id, "User disabled");
    Ok(updated)
}
