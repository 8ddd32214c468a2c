//! Database models for the tenant authentication service
//!
//! Row structs map to the `tenants`, `users`, `user_profiles` and
//! `tenant_users` tables. The `New*` structs carry data for inserts.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role granted to every account created through self-registration
pub const DEFAULT_ROLE: &str = "user";

/// Plan reported when a user row has none
pub const DEFAULT_PLAN: &str = "free";

// ============================================================================
// Tenant Model
// ============================================================================

/// Tenant entity. Provisioned elsewhere, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    /// Externally supplied handle (`X-Tenant-Page-Id`)
    pub page_id: String,
}

// ============================================================================
// User Models
// ============================================================================

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub plan: String,
}

/// Profile owned 1:1 by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profile_img: String,
}

/// Membership row linking a user to a tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantMembership {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

/// User joined with its profile, as read by the login flow
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub plan: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_img: String,
}

/// Everything needed to create a user, its profile and its first membership
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Result of a committed registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub user_id: Uuid,
    pub plan: String,
}

/// User data returned to clients (never contains the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub profile_img: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub plan: String,
}
