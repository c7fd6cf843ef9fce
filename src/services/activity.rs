//! Batched reads of agent activity feeding the dashboard reducers.
//!
//! Each function drains its query through [`fetch_all_pages`] and returns
//! every matching row for the given agents. An empty agent list short-circuits
//! without touching the database.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::paging::{fetch_all_pages, BatchLimits};
use crate::errors::AppError;
use crate::models::dwr::DailyReport;
use crate::models::interaction::{CorporateInteraction, DomesticInteraction};
use crate::models::lead::{CorporateLead, DomesticClient};
use crate::models::range::DateRange;
use crate::models::target::{month_start, Target};

pub const CORPORATE_INTERACTIONS: &str = "corporate_leads_interaction";
pub const CORPORATE_LEADS: &str = "corporate_leadgen_leads";
pub const DOMESTIC_INTERACTIONS: &str = "domestic_clients_interaction";
pub const DOMESTIC_CLIENTS: &str = "domestic_clients";
pub const CLIENT_STATUS: &str = "domestic_client_status";
pub const DAILY_REPORTS: &str = "dwr_history";
pub const TARGETS: &str = "targets";

/// Calls logged by `agents` with a contact date inside `range`.
pub async fn corporate_interactions(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<Vec<CorporateInteraction>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, CorporateInteraction>(
            r#"
            SELECT id, lead_id, leadgen_id, contact_date, contact_person, status,
                   sub_status, franchise_status, remarks, created_at
            FROM corporate_leads_interaction
            WHERE leadgen_id = ANY($1)
              AND COALESCE(contact_date, created_at::date) BETWEEN $2 AND $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(agents)
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Leads owned by `agents` whose sourcing date falls inside `range`.
pub async fn corporate_leads_sourced(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<Vec<CorporateLead>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, CorporateLead>(
            r#"
            SELECT id, leadgen_id, company_name, contact_person, contact_phone, contact_email,
                   is_startup, sourcing_date, lock_date, projection, created_at
            FROM corporate_leadgen_leads
            WHERE leadgen_id = ANY($1) AND sourcing_date BETWEEN $2 AND $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(agents)
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Visits logged by `agents` with a contact date inside `range`.
pub async fn domestic_interactions(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<Vec<DomesticInteraction>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, DomesticInteraction>(
            r#"
            SELECT id, client_id, fse_id, contact_date, contact_person, status,
                   sub_status, remarks, created_at
            FROM domestic_clients_interaction
            WHERE fse_id = ANY($1)
              AND COALESCE(contact_date, created_at::date) BETWEEN $2 AND $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(agents)
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Newest visit of every client `agents` have ever visited, one row per client.
///
/// Same ordering as [`Recency::CreatedAt`](crate::services::latest::Recency):
/// `created_at`, then the greater id.
pub async fn latest_client_visits(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
) -> Result<Vec<DomesticInteraction>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, DomesticInteraction>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (client_id)
                       id, client_id, fse_id, contact_date, contact_person, status,
                       sub_status, remarks, created_at
                FROM domestic_clients_interaction
                WHERE fse_id = ANY($1)
                ORDER BY client_id, created_at DESC, id DESC
            ) latest
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(agents)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Clients owned by `agents` whose sourcing date falls inside `range`.
pub async fn domestic_clients_added(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<Vec<DomesticClient>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, DomesticClient>(
            r#"
            SELECT id, fse_id, client_name, contact_person, contact_phone, location,
                   is_startup, sourcing_date, projection, created_at
            FROM domestic_clients
            WHERE fse_id = ANY($1) AND sourcing_date BETWEEN $2 AND $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(agents)
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Daily work reports filed by `agents` inside `range`.
pub async fn daily_reports(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<Vec<DailyReport>, AppError> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }
    fetch_all_pages(limits, |offset, limit| async move {
        sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, user_id, report_date, summary, calls_made, visits_made, created_at
            FROM dwr_history
            WHERE user_id = ANY($1) AND report_date BETWEEN $2 AND $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(agents)
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
    })
    .await
}

/// Target row for `user_id` in the month containing `day`.
pub async fn month_target(
    pool: &PgPool,
    user_id: Uuid,
    day: chrono::NaiveDate,
) -> Result<Option<Target>, AppError> {
    let target = sqlx::query_as::<_, Target>(
        "SELECT * FROM targets WHERE user_id = $1 AND month = $2",
    )
    .bind(user_id)
    .bind(month_start(day))
    .fetch_optional(pool)
    .await?;
    Ok(target)
}
