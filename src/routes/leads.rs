//! Lead and client registry routes for LeadGen and FSE agents.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireFse, RequireLeadGen};
use crate::models::interaction::{CorporateInteraction, CreateInteraction, DomesticInteraction};
use crate::models::lead::{CorporateLead, CreateCorporateLead, CreateDomesticClient, DomesticClient};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::leads::{self as lead_service, WithStatus};
use crate::services::team;
use crate::AppState;

/// `?agent_id=` lets a manager browse a direct report's records.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub agent_id: Option<Uuid>,
}

async fn owner_in_scope(
    state: &AppState,
    user: &CurrentUser,
    query: &OwnerQuery,
) -> Result<Uuid, AppError> {
    let owner = query.agent_id.unwrap_or(user.id);
    team::ensure_owner_or_manager(&state.db, user, owner).await?;
    Ok(owner)
}

// -- Corporate leads --

/// POST /api/v1/leadgen/leads: source a new corporate lead.
pub async fn create_lead(
    State(state): State<AppState>,
    RequireLeadGen(user): RequireLeadGen,
    Json(body): Json<CreateCorporateLead>,
) -> Result<Json<ApiResponse<CorporateLead>>, AppError> {
    body.validate()?;
    let lead = lead_service::create_corporate_lead(&state.db, user.id, &body).await?;
    Ok(ApiResponse::success(lead))
}

/// GET /api/v1/leadgen/leads: the caller's leads, or a direct report's.
pub async fn list_leads(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<PagedResult<CorporateLead>>>, AppError> {
    let owner_id = owner_in_scope(&state, &current_user, &owner).await?;
    let result = lead_service::list_corporate_leads(&state.db, owner_id, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/leadgen/leads/{id}: lead with its current status.
pub async fn get_lead(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithStatus<CorporateLead, CorporateInteraction>>>, AppError> {
    let lead = lead_service::find_corporate_lead(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, lead.leadgen_id).await?;
    let result = lead_service::corporate_lead_with_status(&state.db, lead).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/leadgen/leads/{id}/interactions: call log, newest first.
pub async fn list_lead_interactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CorporateInteraction>>>, AppError> {
    let lead = lead_service::find_corporate_lead(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, lead.leadgen_id).await?;
    let rows = lead_service::list_corporate_interactions(&state.db, lead.id).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/leadgen/leads/{id}/interactions: log a call.
pub async fn add_lead_interaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateInteraction>,
) -> Result<Json<ApiResponse<CorporateInteraction>>, AppError> {
    body.validate()?;
    let lead = lead_service::find_corporate_lead(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, lead.leadgen_id).await?;
    let row = lead_service::add_corporate_interaction(&state.db, &lead, &body).await?;
    Ok(ApiResponse::success(row))
}

// -- Domestic clients --

/// POST /api/v1/fse/clients: register a domestic client.
pub async fn create_client(
    State(state): State<AppState>,
    RequireFse(user): RequireFse,
    Json(body): Json<CreateDomesticClient>,
) -> Result<Json<ApiResponse<DomesticClient>>, AppError> {
    body.validate()?;
    let client = lead_service::create_domestic_client(&state.db, user.id, &body).await?;
    Ok(ApiResponse::success(client))
}

/// GET /api/v1/fse/clients: the caller's clients, or a direct report's.
pub async fn list_clients(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<PagedResult<DomesticClient>>>, AppError> {
    let owner_id = owner_in_scope(&state, &current_user, &owner).await?;
    let result = lead_service::list_domestic_clients(&state.db, owner_id, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/fse/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithStatus<DomesticClient, DomesticInteraction>>>, AppError> {
    let client = lead_service::find_domestic_client(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, client.fse_id).await?;
    let result = lead_service::domestic_client_with_status(&state.db, client).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/fse/clients/{id}/interactions
pub async fn list_client_interactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<DomesticInteraction>>>, AppError> {
    let client = lead_service::find_domestic_client(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, client.fse_id).await?;
    let rows = lead_service::list_domestic_interactions(&state.db, client.id).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/v1/fse/clients/{id}/interactions: log a visit.
pub async fn add_client_interaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateInteraction>,
) -> Result<Json<ApiResponse<DomesticInteraction>>, AppError> {
    body.validate()?;
    let client = lead_service::find_domestic_client(&state.db, id).await?;
    team::ensure_owner_or_manager(&state.db, &current_user, client.fse_id).await?;
    let row = lead_service::add_domestic_interaction(&state.db, &client, &body).await?;
    Ok(ApiResponse::success(row))
}
