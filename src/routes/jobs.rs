//! Job description routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireJobAuthor;
use crate::models::job::{CreateJob, JobDescription, JobFilters, UpdateJob};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::jobs as job_service;
use crate::AppState;

/// GET /api/v1/jobs: list job descriptions with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<ApiResponse<PagedResult<JobDescription>>>, AppError> {
    let result = job_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/jobs
pub async fn create(
    State(state): State<AppState>,
    RequireJobAuthor(author): RequireJobAuthor,
    Json(body): Json<CreateJob>,
) -> Result<Json<ApiResponse<JobDescription>>, AppError> {
    body.validate()?;
    let job = job_service::create(&state.db, author.id, &body).await?;
    Ok(ApiResponse::success(job))
}

/// GET /api/v1/jobs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobDescription>>, AppError> {
    let job = job_service::find(&state.db, id).await?;
    Ok(ApiResponse::success(job))
}

/// PUT /api/v1/jobs/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireJobAuthor(_author): RequireJobAuthor,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateJob>,
) -> Result<Json<ApiResponse<JobDescription>>, AppError> {
    body.validate()?;
    let job = job_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(job))
}
