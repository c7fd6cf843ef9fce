//! Daily work reports: one row per user per day.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::dwr::{DailyReport, SubmitReport};
use crate::models::range::DateRange;
use crate::services::team;

/// Create or replace the caller's report for `input.report_date`.
pub async fn submit(
    pool: &PgPool,
    user_id: Uuid,
    input: &SubmitReport,
) -> Result<DailyReport, AppError> {
    let report = sqlx::query_as::<_, DailyReport>(
        r#"
        INSERT INTO dwr_history (user_id, report_date, summary, calls_made, visits_made)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, report_date) DO UPDATE
        SET summary = EXCLUDED.summary,
            calls_made = EXCLUDED.calls_made,
            visits_made = EXCLUDED.visits_made
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(input.report_date)
    .bind(input.summary.trim())
    .bind(input.calls_made)
    .bind(input.visits_made)
    .fetch_one(pool)
    .await?;

    tracing::debug!(user_id = %user_id, report_date = %input.report_date, "DWR saved");
    Ok(report)
}

/// Reports for the caller, or for `agent_id` when the caller manages that agent.
pub async fn list(
    pool: &PgPool,
    caller: &CurrentUser,
    agent_id: Option<Uuid>,
    range: DateRange,
) -> Result<Vec<DailyReport>, AppError> {
    let user_id = agent_id.unwrap_or(caller.id);
    team::ensure_owner_or_manager(pool, caller, user_id).await?;

    let rows = sqlx::query_as::<_, DailyReport>(
        r#"
        SELECT * FROM dwr_history
        WHERE user_id = $1 AND report_date BETWEEN $2 AND $3
        ORDER BY report_date DESC
        "#,
    )
    .bind(user_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
