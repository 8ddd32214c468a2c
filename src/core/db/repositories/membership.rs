//! Tenant membership repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::store::StoreError;

/// Membership repository for database operations
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Role of a user within a tenant, `None` when no membership row exists
    pub async fn find_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<String>, StoreError> {
        let role: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT role
            FROM tenant_users
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.map(|(role,)| role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::repositories::test_support::{create_test_pool, create_test_tenant};

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_role_absent() {
        let pool = create_test_pool().await;
        let tenant_id = create_test_tenant(&pool).await;
        let repo = MembershipRepository::new(pool);

        let role = repo.find_role(tenant_id, Uuid::new_v4()).await.unwrap();
        assert!(role.is_none());
    }
}
