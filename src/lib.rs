//! Tenant Auth - multi-tenant authentication service
//!
//! Users hold one global account and join tenants through memberships.
//! Every request names its tenant in the `X-Tenant-Page-Id` header; login,
//! registration and session checks are all scoped to that tenant.

pub mod core;
