//! Tenant-scoped authentication
//!
//! This module provides:
//! - Tenant resolution from the `X-Tenant-Page-Id` header
//! - Password hashing and session token signing
//! - Login, registration and session introspection per tenant
//! - REST API endpoints with cookie-based session transport

pub mod api;
pub mod cookie;
pub mod jwt;
pub mod membership;
pub mod password;
pub mod service;
pub mod tenant;

pub use api::{ApiResponse, AuthApiState, auth_api_router};
pub use cookie::{AUTH_COOKIE_NAME, CookieSettings};
pub use jwt::{IssuedToken, JwtConfig, JwtError, JwtService, SessionClaims, SessionLifetime};
pub use membership::MembershipAuthorizer;
pub use password::PasswordHasher;
pub use service::{AuthError, AuthService, AuthSession, LoginRequest, RegisterRequest};
pub use tenant::{ResolvedTenant, TENANT_HEADER, TenantResolver};
