//! Tenant resolution
//!
//! Maps the `X-Tenant-Page-Id` request header to an internal tenant id.
//! Every auth route takes a [`ResolvedTenant`] argument, so the id is
//! passed explicitly down each call chain.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::core::auth::api::AuthApiState;
use crate::core::auth::service::AuthError;
use crate::core::db::AuthStore;

/// Header carrying the external tenant handle
pub const TENANT_HEADER: &str = "X-Tenant-Page-Id";

/// Resolves external tenant handles against the store
#[derive(Clone)]
pub struct TenantResolver<S> {
    store: S,
}

impl<S: AuthStore> TenantResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve a handle to the tenant id.
    ///
    /// Empty handles fail before touching storage.
    pub async fn resolve(&self, handle: &str) -> Result<Uuid, AuthError> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(AuthError::TenantNotSpecified);
        }

        match self.store.find_tenant_id(handle).await {
            Ok(Some(tenant_id)) => Ok(tenant_id),
            Ok(None) => {
                tracing::debug!("Unknown tenant handle: {}", handle);
                Err(AuthError::TenantNotFound)
            }
            Err(e) => Err(AuthError::StorageUnavailable(e)),
        }
    }
}

/// Tenant id resolved from the current request's header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTenant(pub Uuid);

impl<S> FromRequestParts<Arc<AuthApiState<S>>> for ResolvedTenant
where
    S: AuthStore,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AuthApiState<S>>,
    ) -> Result<Self, Self::Rejection> {
        // A header that is not valid visible ASCII counts as absent
        let handle = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let tenant_id = state.auth_service.resolve_tenant(&handle).await?;
        Ok(ResolvedTenant(tenant_id))
    }
}
