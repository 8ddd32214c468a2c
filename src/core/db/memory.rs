//! In-process [`AuthStore`] for tests
//!
//! Mirrors the PostgreSQL schema constraints that matter to the auth flows:
//! unique tenant handles, unique emails, one membership per (tenant, user),
//! and all-or-nothing account creation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::core::db::models::{
    CreatedAccount, DEFAULT_PLAN, NewAccount, TenantMembership, User, UserCredentials, UserProfile,
};
use crate::core::db::store::{AuthStore, StoreError};

/// Row counts across the account tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub users: usize,
    pub profiles: usize,
    pub memberships: usize,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tenants: HashMap<String, Uuid>,
    users: Vec<User>,
    profiles: Vec<UserProfile>,
    memberships: Vec<TenantMembership>,
    unavailable: bool,
    fail_membership_insert: bool,
}

impl MemoryState {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Shared in-memory store; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a tenant handle, returning its id
    pub fn add_tenant(&self, page_id: &str) -> Uuid {
        let mut state = self.lock();
        *state
            .tenants
            .entry(page_id.to_string())
            .or_insert_with(Uuid::new_v4)
    }

    /// Seed a user with profile but without any membership
    pub fn add_user(&self, email: &str, password_hash: &str, first_name: &str, last_name: &str) -> Uuid {
        let mut state = self.lock();
        let id = Uuid::new_v4();
        state.users.push(User {
            id,
            email: email.to_string(),
            password: password_hash.to_string(),
            plan: DEFAULT_PLAN.to_string(),
        });
        state.profiles.push(UserProfile {
            user_id: id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_img: String::new(),
        });
        id
    }

    /// Seed or replace a membership row
    pub fn add_membership(&self, tenant_id: Uuid, user_id: Uuid, role: &str) {
        let mut state = self.lock();
        state
            .memberships
            .retain(|m| !(m.tenant_id == tenant_id && m.user_id == user_id));
        state.memberships.push(TenantMembership {
            tenant_id,
            user_id,
            role: role.to_string(),
        });
    }

    /// Make every call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Make the membership insert of the next registrations fail
    pub fn set_fail_membership_insert(&self, fail: bool) {
        self.lock().fail_membership_insert = fail;
    }

    pub fn counts(&self) -> TableCounts {
        let state = self.lock();
        TableCounts {
            users: state.users.len(),
            profiles: state.profiles.len(),
            memberships: state.memberships.len(),
        }
    }

    /// Memberships of a user across all tenants
    pub fn memberships_of(&self, user_id: Uuid) -> Vec<TenantMembership> {
        self.lock()
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Profile of a user, if one exists
    pub fn profile_of(&self, user_id: Uuid) -> Option<UserProfile> {
        self.lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
    }
}

impl AuthStore for MemoryStore {
    async fn find_tenant_id(&self, page_id: &str) -> Result<Option<Uuid>, StoreError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.tenants.get(page_id).copied())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.users.iter().any(|u| u.email == email))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, StoreError> {
        let state = self.lock();
        state.check_available()?;

        let Some(user) = state.users.iter().find(|u| u.email == email) else {
            return Ok(None);
        };
        let profile = state.profiles.iter().find(|p| p.user_id == user.id);

        Ok(Some(UserCredentials {
            id: user.id,
            email: user.email.clone(),
            password_hash: user.password.clone(),
            plan: user.plan.clone(),
            first_name: profile.map(|p| p.first_name.clone()).unwrap_or_default(),
            last_name: profile.map(|p| p.last_name.clone()).unwrap_or_default(),
            profile_img: profile.map(|p| p.profile_img.clone()).unwrap_or_default(),
        }))
    }

    async fn find_membership_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<String>, StoreError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.tenant_id == tenant_id && m.user_id == user_id)
            .map(|m| m.role.clone()))
    }

    async fn create_account(
        &self,
        tenant_id: Uuid,
        account: &NewAccount,
    ) -> Result<CreatedAccount, StoreError> {
        let mut state = self.lock();
        state.check_available()?;

        // Work on a snapshot; it only replaces the live state on commit.
        let mut tx = state.clone();

        if tx.users.iter().any(|u| u.email == account.email) {
            return Err(StoreError::EmailAlreadyExists);
        }

        let user_id = Uuid::new_v4();
        tx.users.push(User {
            id: user_id,
            email: account.email.clone(),
            password: account.password_hash.clone(),
            plan: DEFAULT_PLAN.to_string(),
        });
        tx.profiles.push(UserProfile {
            user_id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            profile_img: String::new(),
        });

        if tx.fail_membership_insert || !tx.tenants.values().any(|id| *id == tenant_id) {
            return Err(StoreError::DatabaseError(sqlx::Error::Protocol(
                "insert into tenant_users failed".to_string(),
            )));
        }
        tx.memberships.push(TenantMembership {
            tenant_id,
            user_id,
            role: account.role.clone(),
        });

        *state = tx;

        Ok(CreatedAccount {
            user_id,
            plan: DEFAULT_PLAN.to_string(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::models::DEFAULT_ROLE;

    fn account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_account_commits_all_rows() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("shop-a");

        let created = store
            .create_account(tenant, &account("new@x.com"))
            .await
            .unwrap();

        assert_eq!(
            store.counts(),
            TableCounts {
                users: 1,
                profiles: 1,
                memberships: 1
            }
        );
        assert_eq!(
            store
                .find_membership_role(tenant, created.user_id)
                .await
                .unwrap()
                .as_deref(),
            Some(DEFAULT_ROLE)
        );
    }

    #[tokio::test]
    async fn test_create_account_failure_leaves_nothing() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("shop-a");
        store.set_fail_membership_insert(true);

        let result = store.create_account(tenant, &account("new@x.com")).await;

        assert!(matches!(result, Err(StoreError::DatabaseError(_))));
        assert_eq!(store.counts(), TableCounts::default());
        assert!(!store.email_exists("new@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_account_duplicate_email() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("shop-a");
        store.add_user("taken@x.com", "hash", "A", "B");

        let result = store.create_account(tenant, &account("taken@x.com")).await;

        assert!(matches!(result, Err(StoreError::EmailAlreadyExists)));
        assert_eq!(store.counts().users, 1);
        assert_eq!(store.counts().memberships, 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.add_tenant("shop-a");
        store.set_unavailable(true);

        assert!(store.find_tenant_id("shop-a").await.is_err());
        assert!(store.email_exists("a@x.com").await.is_err());
        assert!(store.ping().await.is_err());
    }

    #[test]
    fn test_add_tenant_is_idempotent() {
        let store = MemoryStore::new();
        assert_eq!(store.add_tenant("shop-a"), store.add_tenant("shop-a"));
        assert_ne!(store.add_tenant("shop-a"), store.add_tenant("shop-b"));
    }
}
