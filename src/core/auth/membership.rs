//! Tenant membership checks
//!
//! A membership row with a non-empty role is the only thing that lets a
//! user act inside a tenant. A missing row and an empty role are reported
//! the same way.

use uuid::Uuid;

use crate::core::auth::service::AuthError;
use crate::core::db::AuthStore;

#[derive(Clone)]
pub struct MembershipAuthorizer<S> {
    store: S,
}

impl<S: AuthStore> MembershipAuthorizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Role of the user in the tenant, or `None` when there is no usable membership
    pub async fn role(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let role = self
            .store
            .find_membership_role(tenant_id, user_id)
            .await
            .map_err(AuthError::StorageUnavailable)?;

        Ok(role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()))
    }

    /// Role of the user in the tenant, failing with `NotTenantMember` when absent
    pub async fn require_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<String, AuthError> {
        match self.role(tenant_id, user_id).await? {
            Some(role) => Ok(role),
            None => {
                tracing::warn!(%tenant_id, %user_id, "User is not a member of this tenant");
                Err(AuthError::NotTenantMember)
            }
        }
    }
}
