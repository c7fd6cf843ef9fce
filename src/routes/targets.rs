//! Monthly target routes.

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::target::{SetTarget, Target, TargetQuery};
use crate::services::targets as target_service;
use crate::AppState;

/// PUT /api/v1/targets: upsert a subordinate's month target.
pub async fn set(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<SetTarget>,
) -> Result<Json<ApiResponse<Target>>, AppError> {
    body.validate()?;
    let target = target_service::set_target(&state.db, &current_user, &body).await?;
    Ok(ApiResponse::success(target))
}

/// GET /api/v1/targets?month&user_id
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TargetQuery>,
) -> Result<Json<ApiResponse<Vec<Target>>>, AppError> {
    let targets = target_service::get_targets(&state.db, &current_user, &query).await?;
    Ok(ApiResponse::success(targets))
}
