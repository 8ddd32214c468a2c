//! Tenant repository
//!
//! Tenants are provisioned outside this service; lookups are read-only.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::Tenant;
use crate::core::db::store::StoreError;

/// Tenant repository for database operations
#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tenant by its external handle
    pub async fn find_by_page_id(&self, page_id: &str) -> Result<Option<Tenant>, StoreError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, page_id
            FROM tenants
            WHERE page_id = $1
            "#,
        )
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }
}
