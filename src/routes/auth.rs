//! Login, token refresh, profile, and user provisioning.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireUserAdmin;
use crate::models::user::{CreateUser, UserResponse};
use crate::services::auth::{self as auth_service, TokenPair};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    // Malformed credentials get the same 401 as wrong ones.
    body.validate().map_err(|_| AppError::Unauthorized)?;
    let settings = state.token_settings();
    let tokens = auth_service::login(&state.db, &settings, &body.email, &body.password).await?;
    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let settings = state.token_settings();
    let tokens = auth_service::refresh(&state.db, &settings, &body.refresh_token).await?;
    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/logout. Tokens are stateless; the client discards them.
pub async fn logout() -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("Logged out successfully")
}

/// POST /api/v1/auth/users (ADMIN or HOD)
pub async fn create_user(
    State(state): State<AppState>,
    RequireUserAdmin(admin): RequireUserAdmin,
    Json(body): Json<CreateUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    body.validate()?;
    let user = auth_service::create_user(&state.db, &body).await?;
    tracing::info!(created_by = %admin.id, user_id = %user.id, "User provisioned");
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
