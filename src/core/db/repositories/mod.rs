//! Database repositories
//!
//! PostgreSQL implementations of the data access used by the auth
//! components. [`PgAuthStore`] composes them behind the [`AuthStore`] seam.

pub mod membership;
pub mod tenant;
pub mod user;

pub use membership::MembershipRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreatedAccount, NewAccount, UserCredentials};
use crate::core::db::store::{AuthStore, StoreError};

/// PostgreSQL-backed [`AuthStore`]
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
    tenants: TenantRepository,
    users: UserRepository,
    memberships: MembershipRepository,
}

impl PgAuthStore {
    /// Create a store sharing one connection pool across repositories
    pub fn new(pool: PgPool) -> Self {
        Self {
            tenants: TenantRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            pool,
        }
    }
}

impl AuthStore for PgAuthStore {
    async fn find_tenant_id(&self, page_id: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self
            .tenants
            .find_by_page_id(page_id)
            .await?
            .map(|tenant| tenant.id))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.users.email_exists(email).await
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, StoreError> {
        self.users.find_credentials(email).await
    }

    async fn find_membership_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<String>, StoreError> {
        self.memberships.find_role(tenant_id, user_id).await
    }

    async fn create_account(
        &self,
        tenant_id: Uuid,
        account: &NewAccount,
    ) -> Result<CreatedAccount, StoreError> {
        self.users.create_account(tenant_id, account).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
