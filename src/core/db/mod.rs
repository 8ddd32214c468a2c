//! Database module
//!
//! Connectivity, models, the [`AuthStore`] seam and its PostgreSQL
//! implementation. Tests get an in-memory store as well.

#[cfg(test)]
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod store;

#[cfg(test)]
pub use memory::MemoryStore;
pub use models::*;
pub use pool::{DbConfig, DbError, create_pool, create_pool_with_migrations};
pub use repositories::{MembershipRepository, PgAuthStore, TenantRepository, UserRepository};
pub use store::{AuthStore, StoreError};

pub use sqlx::PgPool;
