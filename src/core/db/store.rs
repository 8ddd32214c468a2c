//! Storage seam for the authentication subsystem
//!
//! `AuthStore` is the only way the auth components reach persistent state.
//! The PostgreSQL implementation lives in [`super::repositories`]; tests
//! use an in-process implementation in the `memory` module.

use std::future::Future;

use uuid::Uuid;

use crate::core::db::DbError;
use crate::core::db::models::{CreatedAccount, NewAccount, UserCredentials};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The email uniqueness constraint rejected an insert
    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionError(e) => StoreError::DatabaseError(e),
            _ => StoreError::DatabaseError(sqlx::Error::Protocol(err.to_string())),
        }
    }
}

/// Persistent state needed by tenant resolution, login and registration
pub trait AuthStore: Clone + Send + Sync + 'static {
    /// Look up the internal tenant id for an external handle
    fn find_tenant_id(
        &self,
        page_id: &str,
    ) -> impl Future<Output = Result<Option<Uuid>, StoreError>> + Send;

    /// Whether any user row has this email
    fn email_exists(&self, email: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Load a user with its profile and password hash
    fn find_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserCredentials>, StoreError>> + Send;

    /// Role of the user inside the tenant, if a membership row exists
    fn find_membership_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Insert user, profile and membership in one transaction.
    ///
    /// Either all three rows become visible or none do. A lost race on the
    /// email constraint returns [`StoreError::EmailAlreadyExists`].
    fn create_account(
        &self,
        tenant_id: Uuid,
        account: &NewAccount,
    ) -> impl Future<Output = Result<CreatedAccount, StoreError>> + Send;

    /// Cheap round trip used by the health endpoint
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::EmailAlreadyExists.to_string(),
            "Email already exists"
        );

        let err = StoreError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Database error"));
    }

    #[test]
    fn test_store_error_from_db_error() {
        let err: StoreError = DbError::MissingDatabaseUrl.into();
        assert!(matches!(
            err,
            StoreError::DatabaseError(sqlx::Error::Protocol(_))
        ));
    }
}
