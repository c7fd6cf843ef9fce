//! Job description CRUD.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{CreateJob, JobDescription, JobFilters, UpdateJob};
use crate::models::pagination::{PagedResult, Pagination};

pub async fn create(
    pool: &PgPool,
    author_id: Uuid,
    input: &CreateJob,
) -> Result<JobDescription, AppError> {
    let job = sqlx::query_as::<_, JobDescription>(
        r#"
        INSERT INTO job_descriptions (client_id, title, description, location, openings, status, created_by)
        VALUES ($1, $2, $3, $4, $5, 'OPEN', $6)
        RETURNING *
        "#,
    )
    .bind(input.client_id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&input.location)
    .bind(input.openings)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Validation("client_id does not reference a known client".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(job_id = %job.id, created_by = %author_id, "Job description created");
    Ok(job)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<JobDescription, AppError> {
    sqlx::query_as::<_, JobDescription>("SELECT * FROM job_descriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Job description not found".to_string()))
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateJob,
) -> Result<JobDescription, AppError> {
    sqlx::query_as::<_, JobDescription>(
        r#"
        UPDATE job_descriptions
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            location = COALESCE($3, location),
            openings = COALESCE($4, openings),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(input.title.as_deref().map(str::trim))
    .bind(&input.description)
    .bind(&input.location)
    .bind(input.openings)
    .bind(input.status)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Job description not found".to_string()))
}

pub async fn list(
    pool: &PgPool,
    filters: &JobFilters,
    pagination: &Pagination,
) -> Result<PagedResult<JobDescription>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM job_descriptions
        WHERE ($1::job_status IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR client_id = $2)
        "#,
    )
    .bind(filters.status)
    .bind(filters.client_id)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, JobDescription>(
        r#"
        SELECT * FROM job_descriptions
        WHERE ($1::job_status IS NULL OR status = $1)
          AND ($2::uuid IS NULL OR client_id = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filters.status)
    .bind(filters.client_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}
