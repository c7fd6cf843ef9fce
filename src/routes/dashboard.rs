//! Role dashboards: LeadGen metrics, FSE dashboard, manager and HOD views.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireHod, RequireManager};
use crate::models::range::{DateRange, RangeQuery};
use crate::models::user::{TeamMember, UserRole};
use crate::services::fse_dashboard::{self, FseDashboard};
use crate::services::leadgen_metrics::{self, LeadgenMetrics};
use crate::services::team::{self, ManagerSummary};
use crate::services::team_dashboard::{self, TeamDashboard};
use crate::AppState;

/// GET /api/v1/leadgen/metrics: funnel metrics for the caller or their team.
pub async fn leadgen_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<LeadgenMetrics>>, AppError> {
    let range = DateRange::from_query(&query)?;
    let agents =
        team::resolve_agents(&state.db, &current_user, UserRole::LeadGen, query.agent_id).await?;
    let limits = state.batch_limits();

    let metrics = leadgen_metrics::get_metrics(&state.db, limits, &agents, range).await?;
    Ok(ApiResponse::success(metrics))
}

/// GET /api/v1/fse/dashboard: visit and client metrics for the caller or their team.
pub async fn fse_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<FseDashboard>>, AppError> {
    let range = DateRange::from_query(&query)?;
    let agents =
        team::resolve_agents(&state.db, &current_user, UserRole::Fse, query.agent_id).await?;
    let limits = state.batch_limits();

    let dashboard = fse_dashboard::get_dashboard(&state.db, limits, &agents, range).await?;
    Ok(ApiResponse::success(dashboard))
}

/// GET /api/v1/manager/team: direct reports of the caller.
pub async fn manager_team(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
) -> Result<Json<ApiResponse<Vec<TeamMember>>>, AppError> {
    let members = team::direct_reports(&state.db, manager.id).await?;
    Ok(ApiResponse::success(members))
}

/// GET /api/v1/manager/dashboard: per-report activity summary.
pub async fn manager_dashboard(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<TeamDashboard>>, AppError> {
    let range = DateRange::from_query(&query)?;
    let limits = state.batch_limits();

    let dashboard = team_dashboard::get_dashboard(&state.db, limits, manager.id, range).await?;
    Ok(ApiResponse::success(dashboard))
}

/// GET /api/v1/hod/managers: every manager with report counts.
pub async fn hod_managers(
    State(state): State<AppState>,
    RequireHod(_hod): RequireHod,
) -> Result<Json<ApiResponse<Vec<ManagerSummary>>>, AppError> {
    let managers = team::list_managers(&state.db).await?;
    Ok(ApiResponse::success(managers))
}
