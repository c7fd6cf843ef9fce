//! Daily work report routes.

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::dwr::{DailyReport, SubmitReport};
use crate::models::range::{DateRange, RangeQuery};
use crate::services::dwr as dwr_service;
use crate::AppState;

/// POST /api/v1/dwr: create or replace the caller's report for a day.
pub async fn submit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<SubmitReport>,
) -> Result<Json<ApiResponse<DailyReport>>, AppError> {
    body.validate()?;
    let report = dwr_service::submit(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(report))
}

/// GET /api/v1/dwr?from_date&to_date&agent_id
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<DailyReport>>>, AppError> {
    let range = DateRange::from_query(&query)?;
    let reports = dwr_service::list(&state.db, &current_user, query.agent_id, range).await?;
    Ok(ApiResponse::success(reports))
}
