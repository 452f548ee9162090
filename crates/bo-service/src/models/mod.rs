use chrono::{DateTime, Utc};
use common::secret::SecretString;
use common::types::{MeetingId, ProductId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations
// ============================================================================

/// User role.
///
/// Declaration order is privilege order: `SuperAdmin < Admin < Member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        }
    }

    /// SUPER_ADMIN and ADMIN.
    pub fn is_privileged(&self) -> bool {
        match self {
            Role::SuperAdmin | Role::Admin => true,
            Role::Member => false,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "MEMBER" => Ok(Role::Member),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Design,
    Marketing,
    Development,
}

impl Team {
    pub const ALL: [Team; 3] = [Team::Design, Team::Marketing, Team::Development];

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Design => "DESIGN",
            Team::Marketing => "MARKETING",
            Team::Development => "DEVELOPMENT",
        }
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DESIGN" => Ok(Team::Design),
            "MARKETING" => Ok(Team::Marketing),
            "DEVELOPMENT" => Ok(Team::Development),
            _ => Err(format!("Invalid user team: {}", s)),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Beauty,
    Sports,
    Books,
    Food,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "ELECTRONICS",
            Category::Fashion => "FASHION",
            Category::Home => "HOME",
            Category::Beauty => "BEAUTY",
            Category::Sports => "SPORTS",
            Category::Books => "BOOKS",
            Category::Food => "FOOD",
            Category::Other => "OTHER",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ELECTRONICS" => Ok(Category::Electronics),
            "FASHION" => Ok(Category::Fashion),
            "HOME" => Ok(Category::Home),
            "BEAUTY" => Ok(Category::Beauty),
            "SPORTS" => Ok(Category::Sports),
            "BOOKS" => Ok(Category::Books),
            "FOOD" => Ok(Category::Food),
            "OTHER" => Ok(Category::Other),
            _ => Err(format!("Invalid product category: {}", s)),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An authenticated principal.
///
/// `tenant_admin_id` is `None` for a SUPER_ADMIN (self-tenanted) and points at
/// the owning SUPER_ADMIN for ADMIN and MEMBER identities.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub team: Option<Team>,
    pub tenant_admin_id: Option<UserId>,
    pub active: bool,
}

/// E-mail is redacted in Debug output.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &"[REDACTED]")
            .field("role", &self.role)
            .field("team", &self.team)
            .field("tenant_admin_id", &self.tenant_admin_id)
            .field("active", &self.active)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub brand: String,
    pub description: String,
    pub owner_tenant_id: TenantId,
    pub active: bool,
    pub members: BTreeSet<UserId>,
    pub categories: BTreeSet<Category>,
    pub tags: BTreeSet<String>,
}

impl Product {
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

/// Lifecycle of a persisted meeting. A proposal that has not passed
/// validation yet is a [`NewMeeting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub product_id: ProductId,
    pub time: DateTime<Utc>,
    pub owner_tenant_id: TenantId,
    pub active: bool,
}

impl Meeting {
    pub fn status(&self) -> MeetingStatus {
        if self.active {
            MeetingStatus::Active
        } else {
            MeetingStatus::Disabled
        }
    }
}

// ============================================================================
// New records (store inputs)
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub team: Option<Team>,
    pub tenant_admin_id: Option<UserId>,
    pub active: bool,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub brand: String,
    pub description: String,
    pub owner_tenant_id: TenantId,
    pub members: BTreeSet<UserId>,
    pub categories: BTreeSet<Category>,
    pub tags: BTreeSet<String>,
}

/// A proposed meeting, not yet validated or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub product_id: ProductId,
    pub time: DateTime<Utc>,
    pub owner_tenant_id: TenantId,
}

// ============================================================================
// Request bodies
// ============================================================================
//
// Fields are optional at the serde level so missing values surface as
// field-level validation errors instead of a bare deserialization failure.

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct InviteUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Body for product create and update.
///
/// On update, `None` keeps the stored value and `Some` replaces it.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub members: Option<Vec<UserId>>,
}

#[derive(Debug, Deserialize)]
pub struct MeetingRequest {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub time: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub active_users: Vec<Identity>,
    pub inactive_users: Vec<Identity>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: BTreeMap<Team, Vec<Identity>>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
    pub users: Vec<Identity>,
}

/// A meeting together with its product and a human-readable countdown.
#[derive(Debug, Serialize)]
pub struct MeetingView {
    pub meeting: Meeting,
    pub status: MeetingStatus,
    pub meeting_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

#[derive(Debug, Serialize)]
pub struct MeetingListResponse {
    pub meetings: Vec<MeetingView>,
}
