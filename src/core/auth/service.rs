//! Authentication service
//!
//! Business logic for tenant-scoped login, registration and session
//! introspection. Coordinates the tenant resolver, the membership
//! authorizer, the password hasher and the JWT service over a single
//! [`AuthStore`].

use uuid::Uuid;

use crate::core::auth::jwt::{IssuedToken, JwtError, JwtService, SessionLifetime, SessionSubject};
use crate::core::auth::membership::MembershipAuthorizer;
use crate::core::auth::password::{HashingError, PasswordHasher};
use crate::core::auth::tenant::TenantResolver;
use crate::core::db::models::{DEFAULT_ROLE, NewAccount, UserCredentials, UserResponse};
use crate::core::db::{AuthStore, StoreError};
use crate::core::validation::{PasswordPolicy, PasswordViolation, is_valid_email, normalize_email};

/// Authentication error types
///
/// The `Display` text of each variant is what clients see. Variants that
/// wrap an internal error keep it as the source for logging only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Tenant not informed")]
    TenantNotSpecified,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(#[from] PasswordViolation),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Verify email or password")]
    InvalidCredentials,

    #[error("User does not belong to this tenant")]
    NotTenantMember,

    #[error("Could not create session")]
    TokenIssuanceFailed(#[source] JwtError),

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing session token")]
    MissingToken,

    #[error("Internal error")]
    Internal(#[source] HashingError),

    #[error("Service temporarily unavailable")]
    StorageUnavailable(#[source] StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailAlreadyExists => AuthError::EmailAlreadyRegistered,
            _ => AuthError::StorageUnavailable(err),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::InvalidToken => AuthError::TokenInvalid,
            _ => AuthError::TokenIssuanceFailed(err),
        }
    }
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub keep_me_logged_in: bool,
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub keep_me_logged_in: bool,
}

/// Outcome of a successful login or registration
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserResponse,
    pub token: IssuedToken,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    tenants: TenantResolver<S>,
    members: MembershipAuthorizer<S>,
    password_policy: PasswordPolicy,
    hasher: PasswordHasher,
    jwt_service: JwtService,
}

impl<S: AuthStore> AuthService<S> {
    /// Create a new authentication service with the default password policy
    pub fn new(store: S, jwt_service: JwtService) -> Self {
        Self {
            tenants: TenantResolver::new(store.clone()),
            members: MembershipAuthorizer::new(store.clone()),
            store,
            password_policy: PasswordPolicy::default(),
            hasher: PasswordHasher::default(),
            jwt_service,
        }
    }

    /// Set the password policy applied at registration
    pub fn password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    /// Set the password hasher
    pub fn hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Resolve an external tenant handle
    pub async fn resolve_tenant(&self, handle: &str) -> Result<Uuid, AuthError> {
        self.tenants.resolve(handle).await
    }

    /// Check that storage answers
    pub async fn health(&self) -> Result<(), AuthError> {
        self.store
            .ping()
            .await
            .map_err(AuthError::StorageUnavailable)
    }

    /// Authenticate a user inside a tenant and issue a session.
    ///
    /// Unknown email and wrong password produce the same error. Membership
    /// is only checked after the password matched.
    pub async fn login(&self, tenant_id: Uuid, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&request.email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if request.password.is_empty() {
            return Err(PasswordViolation::Empty.into());
        }

        let Some(credentials) = self.store.find_credentials(&email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = match self.hasher.verify(&request.password, &credentials.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(user_id = %credentials.id, "Stored password hash unreadable: {}", e);
                false
            }
        };
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let role = self.members.require_member(tenant_id, credentials.id).await?;

        let lifetime = SessionLifetime::from_keep_me_logged_in(request.keep_me_logged_in);
        let token = self.jwt_service.issue(subject(tenant_id, credentials, role), lifetime)?;

        tracing::info!(user_id = %token.claims.sub, %tenant_id, "User logged in");

        Ok(AuthSession {
            user: user_response(&token),
            token,
        })
    }

    /// Create a user, its profile and a membership in the tenant, then
    /// issue a session for it.
    pub async fn register(
        &self,
        tenant_id: Uuid,
        request: RegisterRequest,
    ) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&request.email);
        let first_name = request.first_name.trim();
        let last_name = request.last_name.trim();

        if first_name.is_empty() || last_name.is_empty() {
            return Err(AuthError::InvalidRequestBody);
        }
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        self.password_policy.check(&request.password)?;

        if self.store.email_exists(&email).await? {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(AuthError::Internal)?;

        let account = NewAccount {
            email,
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: DEFAULT_ROLE.to_string(),
        };
        let created = self.store.create_account(tenant_id, &account).await?;

        let session_subject = SessionSubject {
            user_id: created.user_id,
            tenant_id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            profile_img: String::new(),
            role: account.role,
            plan: created.plan,
        };
        let lifetime = SessionLifetime::from_keep_me_logged_in(request.keep_me_logged_in);

        // The account is committed at this point and stays.
        let token = self
            .jwt_service
            .issue(session_subject, lifetime)
            .map_err(|e| {
                tracing::error!(
                    user_id = %created.user_id,
                    %tenant_id,
                    "Account created but session issuance failed: {}",
                    e
                );
                AuthError::TokenIssuanceFailed(e)
            })?;

        tracing::info!(user_id = %created.user_id, %tenant_id, "User registered");

        Ok(AuthSession {
            user: user_response(&token),
            token,
        })
    }

    /// Identity carried by a session token, if it is valid for this tenant
    pub fn current_user(&self, tenant_id: Uuid, token: &str) -> Result<UserResponse, AuthError> {
        let claims = self.jwt_service.verify(token).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AuthError::from(e)
        })?;

        if claims.tenant_id != tenant_id {
            tracing::warn!(user_id = %claims.sub, %tenant_id, "Token presented to another tenant");
            return Err(AuthError::NotTenantMember);
        }

        Ok(UserResponse {
            id: claims.sub,
            profile_img: claims.profile_img,
            first_name: claims.first_name,
            last_name: claims.last_name,
            email: claims.email,
            role: claims.role,
            plan: claims.plan,
        })
    }
}

fn subject(tenant_id: Uuid, credentials: UserCredentials, role: String) -> SessionSubject {
    SessionSubject {
        user_id: credentials.id,
        tenant_id,
        email: credentials.email,
        first_name: credentials.first_name,
        last_name: credentials.last_name,
        profile_img: credentials.profile_img,
        role,
        plan: credentials.plan,
    }
}

fn user_response(token: &IssuedToken) -> UserResponse {
    let claims = &token.claims;
    UserResponse {
        id: claims.sub,
        profile_img: claims.profile_img.clone(),
        first_name: claims.first_name.clone(),
        last_name: claims.last_name.clone(),
        email: claims.email.clone(),
        role: claims.role.clone(),
        plan: claims.plan.clone(),
    }
}
