//! Expense claim routes: drafts, status transitions, review queues, and export.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireOperations;
use crate::models::expense::{CreateExpense, ExpenseClaim, ExpenseHistory, UpdateExpense};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::expense_lifecycle::{self, TransitionRequest, TransitionResult};
use crate::services::expenses::{self as expense_service, ExpenseFilters};
use crate::AppState;

/// GET /api/v1/expenses: the caller's claims.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ExpenseFilters>,
) -> Result<Json<ApiResponse<PagedResult<ExpenseClaim>>>, AppError> {
    let result =
        expense_service::list_own(&state.db, current_user.id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/expenses: draft a claim.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateExpense>,
) -> Result<Json<ApiResponse<ExpenseClaim>>, AppError> {
    body.validate()?;
    let claim = expense_service::create_claim(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(claim))
}

/// GET /api/v1/expenses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExpenseClaim>>, AppError> {
    let claim = expense_service::find_claim(&state.db, id).await?;
    expense_service::ensure_can_view(&state.db, &current_user, &claim).await?;
    Ok(ApiResponse::success(claim))
}

/// PUT /api/v1/expenses/{id}: owner edits a draft.
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateExpense>,
) -> Result<Json<ApiResponse<ExpenseClaim>>, AppError> {
    body.validate()?;
    let claim = expense_service::update_claim(&state.db, id, &current_user, &body).await?;
    Ok(ApiResponse::success(claim))
}

/// DELETE /api/v1/expenses/{id}: owner discards a draft.
pub async fn delete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    expense_service::delete_claim(&state.db, id, &current_user).await?;
    Ok(ApiResponse::success("Claim deleted"))
}

/// PATCH /api/v1/expenses/{id}/status: move a claim through its lifecycle.
pub async fn update_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<TransitionResult>>, AppError> {
    let result = expense_lifecycle::transition(&state.db, id, &body, &current_user).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/expenses/{id}/history
pub async fn history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ExpenseHistory>>>, AppError> {
    let claim = expense_service::find_claim(&state.db, id).await?;
    expense_service::ensure_can_view(&state.db, &current_user, &claim).await?;
    let rows = expense_service::history(&state.db, claim.id).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/v1/expenses/review: claims waiting on the caller.
pub async fn review_queue(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<ExpenseClaim>>>, AppError> {
    let claims = expense_service::review_queue(&state.db, &current_user).await?;
    Ok(ApiResponse::success(claims))
}

/// GET /api/v1/expenses/export: CSV of approved claims for HR.
pub async fn export(
    State(state): State<AppState>,
    RequireOperations(ops): RequireOperations,
) -> Result<impl IntoResponse, AppError> {
    let rows = expense_service::export_rows(&state.db).await?;
    let body = expense_service::render_csv(&rows)?;
    tracing::info!(exported_by = %ops.id, rows = rows.len(), "Expense export generated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expense_claims.csv\"",
            ),
        ],
        body,
    ))
}
