//! Lead and client registry: CRUD plus the append-only interaction logs.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interaction::{CorporateInteraction, CreateInteraction, DomesticInteraction};
use crate::models::lead::{
    CorporateLead, CreateCorporateLead, CreateDomesticClient, DomesticClient,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::fse_dashboard::CLIENT_STATUS_RECENCY;
use crate::services::latest::{latest_by_key, Recency, Timeline};
use crate::services::leadgen_metrics::LEAD_STATUS_RECENCY;

/// A record together with its newest interaction.
#[derive(Debug, Serialize)]
pub struct WithStatus<T: Serialize, I: Serialize> {
    #[serde(flatten)]
    pub record: T,
    pub current_status: Option<String>,
    pub last_interaction: Option<I>,
}

fn newest<I: Timeline>(rows: Vec<I>, recency: Recency) -> Option<I> {
    latest_by_key(rows, recency).into_values().next()
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// -- Corporate leads --

pub async fn create_corporate_lead(
    pool: &PgPool,
    owner_id: Uuid,
    input: &CreateCorporateLead,
) -> Result<CorporateLead, AppError> {
    let lead = sqlx::query_as::<_, CorporateLead>(
        r#"
        INSERT INTO corporate_leadgen_leads (
            leadgen_id, company_name, contact_person, contact_phone, contact_email,
            is_startup, sourcing_date, lock_date, projection
        )
        VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, CURRENT_DATE), $8, $9)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(input.company_name.trim())
    .bind(trimmed(&input.contact_person))
    .bind(trimmed(&input.contact_phone))
    .bind(trimmed(&input.contact_email))
    .bind(input.is_startup)
    .bind(input.sourcing_date)
    .bind(input.lock_date)
    .bind(trimmed(&input.projection))
    .fetch_one(pool)
    .await?;
    Ok(lead)
}

pub async fn list_corporate_leads(
    pool: &PgPool,
    owner_id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<CorporateLead>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM corporate_leadgen_leads WHERE leadgen_id = $1",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, CorporateLead>(
        "SELECT * FROM corporate_leadgen_leads WHERE leadgen_id = $1 \
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(owner_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

pub async fn find_corporate_lead(pool: &PgPool, id: Uuid) -> Result<CorporateLead, AppError> {
    sqlx::query_as::<_, CorporateLead>("SELECT * FROM corporate_leadgen_leads WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

pub async fn list_corporate_interactions(
    pool: &PgPool,
    lead_id: Uuid,
) -> Result<Vec<CorporateInteraction>, AppError> {
    let rows = sqlx::query_as::<_, CorporateInteraction>(
        "SELECT * FROM corporate_leads_interaction WHERE lead_id = $1 \
         ORDER BY contact_date DESC NULLS LAST, created_at DESC, id DESC",
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn corporate_lead_with_status(
    pool: &PgPool,
    lead: CorporateLead,
) -> Result<WithStatus<CorporateLead, CorporateInteraction>, AppError> {
    let history = list_corporate_interactions(pool, lead.id).await?;
    let last = newest(history, LEAD_STATUS_RECENCY);
    Ok(WithStatus {
        record: lead,
        current_status: last.as_ref().map(|i| i.status.clone()),
        last_interaction: last,
    })
}

/// Append a call outcome. The row is attributed to the lead's owner.
pub async fn add_corporate_interaction(
    pool: &PgPool,
    lead: &CorporateLead,
    input: &CreateInteraction,
) -> Result<CorporateInteraction, AppError> {
    let row = sqlx::query_as::<_, CorporateInteraction>(
        r#"
        INSERT INTO corporate_leads_interaction (
            lead_id, leadgen_id, contact_date, contact_person, status,
            sub_status, franchise_status, remarks
        )
        VALUES ($1, $2, COALESCE($3, CURRENT_DATE), $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(lead.id)
    .bind(lead.leadgen_id)
    .bind(input.contact_date)
    .bind(trimmed(&input.contact_person))
    .bind(input.status.trim())
    .bind(trimmed(&input.sub_status))
    .bind(trimmed(&input.franchise_status))
    .bind(trimmed(&input.remarks))
    .fetch_one(pool)
    .await?;

    tracing::debug!(lead_id = %lead.id, status = %row.status, "Lead interaction logged");
    Ok(row)
}

// -- Domestic clients --

pub async fn create_domestic_client(
    pool: &PgPool,
    owner_id: Uuid,
    input: &CreateDomesticClient,
) -> Result<DomesticClient, AppError> {
    let client = sqlx::query_as::<_, DomesticClient>(
        r#"
        INSERT INTO domestic_clients (
            fse_id, client_name, contact_person, contact_phone, location,
            is_startup, sourcing_date, projection
        )
        VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, CURRENT_DATE), $8)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(input.client_name.trim())
    .bind(trimmed(&input.contact_person))
    .bind(trimmed(&input.contact_phone))
    .bind(trimmed(&input.location))
    .bind(input.is_startup)
    .bind(input.sourcing_date)
    .bind(trimmed(&input.projection))
    .fetch_one(pool)
    .await?;
    Ok(client)
}

pub async fn list_domestic_clients(
    pool: &PgPool,
    owner_id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<DomesticClient>, AppError> {
    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM domestic_clients WHERE fse_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

    let items = sqlx::query_as::<_, DomesticClient>(
        "SELECT * FROM domestic_clients WHERE fse_id = $1 \
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(owner_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

pub async fn find_domestic_client(pool: &PgPool, id: Uuid) -> Result<DomesticClient, AppError> {
    sqlx::query_as::<_, DomesticClient>("SELECT * FROM domestic_clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}

pub async fn list_domestic_interactions(
    pool: &PgPool,
    client_id: Uuid,
) -> Result<Vec<DomesticInteraction>, AppError> {
    let rows = sqlx::query_as::<_, DomesticInteraction>(
        "SELECT * FROM domestic_clients_interaction WHERE client_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn domestic_client_with_status(
    pool: &PgPool,
    client: DomesticClient,
) -> Result<WithStatus<DomesticClient, DomesticInteraction>, AppError> {
    let history = list_domestic_interactions(pool, client.id).await?;
    let last = newest(history, CLIENT_STATUS_RECENCY);
    Ok(WithStatus {
        record: client,
        current_status: last.as_ref().map(|i| i.status.clone()),
        last_interaction: last,
    })
}

/// Append a visit outcome. The row is attributed to the client's owner.
pub async fn add_domestic_interaction(
    pool: &PgPool,
    client: &DomesticClient,
    input: &CreateInteraction,
) -> Result<DomesticInteraction, AppError> {
    let row = sqlx::query_as::<_, DomesticInteraction>(
        r#"
        INSERT INTO domestic_clients_interaction (
            client_id, fse_id, contact_date, contact_person, status, sub_status, remarks
        )
        VALUES ($1, $2, COALESCE($3, CURRENT_DATE), $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(client.id)
    .bind(client.fse_id)
    .bind(input.contact_date)
    .bind(trimmed(&input.contact_person))
    .bind(input.status.trim())
    .bind(trimmed(&input.sub_status))
    .bind(trimmed(&input.remarks))
    .fetch_one(pool)
    .await?;

    tracing::debug!(client_id = %client.id, status = %row.status, "Client visit logged");
    Ok(row)
}
