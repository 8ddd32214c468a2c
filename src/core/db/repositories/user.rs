//! User repository for database operations
//!
//! Reads credentials for login and performs the all-or-nothing account
//! insert (user, profile, membership) for registration.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreatedAccount, NewAccount, UserCredentials};
use crate::core::db::store::StoreError;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user with this email exists
    pub async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    /// Find a user joined with its profile by email
    pub async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT
                u.id,
                u.email,
                u.password AS password_hash,
                COALESCE(u.plan, 'free') AS plan,
                COALESCE(p.first_name, '') AS first_name,
                COALESCE(p.last_name, '') AS last_name,
                COALESCE(p.profile_img, '') AS profile_img
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create user, profile and tenant membership inside one transaction.
    ///
    /// The transaction is rolled back when dropped, so any early return
    /// leaves no rows behind.
    pub async fn create_account(
        &self,
        tenant_id: Uuid,
        account: &NewAccount,
    ) -> Result<CreatedAccount, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (user_id, plan): (Uuid, String) = sqlx::query_as(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING id, COALESCE(plan, 'free')
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, first_name, last_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO tenant_users (tenant_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(&account.role)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CreatedAccount { user_id, plan })
    }
}

/// Translate a unique-constraint failure on `users.email` into a conflict
fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::EmailAlreadyExists
        }
        _ => StoreError::DatabaseError(err),
    }
}
