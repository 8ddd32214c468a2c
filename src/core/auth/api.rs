//! Auth API endpoints
//!
//! Every route except `/health` requires the `X-Tenant-Page-Id` header:
//! - POST /v1/auth/login - Login and receive the session cookie
//! - POST /v1/auth/register - Create an account in the tenant and log in
//! - GET /v1/auth/me - Identity carried by the session cookie
//! - POST /v1/auth/logout - Clear the session cookie
//! - GET /health - Storage liveness

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::cookie::{CookieSettings, attach_session, detach_session, session_token};
use crate::core::auth::service::{AuthError, AuthService, LoginRequest, RegisterRequest};
use crate::core::auth::tenant::ResolvedTenant;
use crate::core::db::AuthStore;
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service and cookie attributes
pub struct AuthApiState<S> {
    pub auth_service: AuthService<S>,
    pub cookies: CookieSettings,
}

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TenantNotSpecified
            | AuthError::InvalidRequestBody
            | AuthError::InvalidEmail
            | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::TenantNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::NotTenantMember => StatusCode::FORBIDDEN,
            AuthError::TokenIssuanceFailed(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::StorageUnavailable(e) => tracing::error!("Storage error: {}", e),
            AuthError::TokenIssuanceFailed(e) => tracing::error!("Token issuance error: {}", e),
            AuthError::Internal(e) => tracing::error!("Internal error: {}", e),
            _ => {}
        }

        let body = ApiResponse::failure(self.to_string());

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AuthError::InvalidRequestBody
    }
}

/// Create the auth API router
pub fn auth_api_router<S: AuthStore>(state: AuthApiState<S>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/v1/auth/login", post(login_handler::<S>))
        .route("/v1/auth/register", post(register_handler::<S>))
        .route("/v1/auth/me", get(me_handler::<S>))
        .route("/v1/auth/logout", post(logout_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .with_state(state)
}

/// POST /v1/auth/login
/// Verify credentials and membership, then set the session cookie
async fn login_handler<S: AuthStore>(
    State(state): State<Arc<AuthApiState<S>>>,
    ResolvedTenant(tenant_id): ResolvedTenant,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), AuthError> {
    let Json(request) = payload?;

    let session = state.auth_service.login(tenant_id, request).await?;
    let jar = attach_session(jar, &state.cookies, &session.token);

    Ok((jar, Json(ApiResponse::ok("Login successful.", session.user))))
}

/// POST /v1/auth/register
/// Create the account and its membership, then set the session cookie
async fn register_handler<S: AuthStore>(
    State(state): State<Arc<AuthApiState<S>>>,
    ResolvedTenant(tenant_id): ResolvedTenant,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), AuthError> {
    let Json(request) = payload?;

    let session = state.auth_service.register(tenant_id, request).await?;
    let jar = attach_session(jar, &state.cookies, &session.token);

    Ok((
        jar,
        Json(ApiResponse::ok("Registration successful.", session.user)),
    ))
}

/// GET /v1/auth/me
/// Identity stored in the session cookie
async fn me_handler<S: AuthStore>(
    State(state): State<Arc<AuthApiState<S>>>,
    ResolvedTenant(tenant_id): ResolvedTenant,
    jar: CookieJar,
) -> Result<Json<ApiResponse<UserResponse>>, AuthError> {
    let token = session_token(&jar).ok_or(AuthError::MissingToken)?;

    let user = state.auth_service.current_user(tenant_id, &token)?;

    Ok(Json(ApiResponse::ok("Authenticated.", user)))
}

/// POST /v1/auth/logout
/// Always clears the session cookie
async fn logout_handler<S: AuthStore>(
    State(state): State<Arc<AuthApiState<S>>>,
    ResolvedTenant(_tenant_id): ResolvedTenant,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = detach_session(jar, &state.cookies);

    (
        jar,
        Json(ApiResponse::message(
            "The user successfully exited the session.",
        )),
    )
}

/// GET /health
async fn health_handler<S: AuthStore>(
    State(state): State<Arc<AuthApiState<S>>>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    state.auth_service.health().await?;

    Ok(Json(ApiResponse::message("ok")))
}
